//! TAC Compiler Driver
//!
//! Reads a program in three-address code (JSON) and writes RV32IM assembly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use tacc_backend::{compile_program, CfgBuilder, LivenessAnalyzer, LoweringOptions, TacProg};

#[derive(Parser)]
#[command(name = "tacc")]
#[command(about = "TAC to RV32IM compiler back-end")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output (enables logging; filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a TAC program to assembly
    Compile {
        /// Input TAC program (JSON)
        input: PathBuf,

        /// Output assembly file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Annotate the assembly with TAC and allocation decisions
        #[arg(long)]
        comments: bool,

        /// Restrict allocation to the first N allocatable registers
        #[arg(long, value_name = "N")]
        registers: Option<usize>,

        /// Print the TAC program before lowering
        #[arg(long)]
        print_tac: bool,

        /// Print each function's basic blocks with liveness
        #[arg(long)]
        print_cfg: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    match cli.command {
        Commands::Compile { input, output, comments, registers, print_tac, print_cfg } => {
            let options = LoweringOptions { emit_comments: comments, register_limit: registers };
            compile_command(&input, output.as_deref(), &options, print_tac, print_cfg)
        }
    }
}

fn compile_command(
    input: &Path,
    output: Option<&Path>,
    options: &LoweringOptions,
    print_tac: bool,
    print_cfg: bool,
) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let prog = TacProg::from_json(&text)
        .with_context(|| format!("{} is not a valid TAC program", input.display()))?;
    info!("loaded {} functions from {}", prog.funcs.len(), input.display());

    if print_tac {
        println!("=== TAC ===");
        println!("{prog}");
    }
    if print_cfg {
        print_cfgs(&prog)?;
    }

    let asm = compile_program(&prog, options)?;

    match output {
        Some(path) => {
            fs::write(path, &asm).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Assembly written to: {}", path.display());
        }
        None => print!("{asm}"),
    }
    Ok(())
}

fn print_cfgs(prog: &TacProg) -> Result<()> {
    println!("=== CFG ===");
    for func in &prog.funcs {
        let mut cfg = CfgBuilder::build(func).map_err(|e| e.in_function(&func.name))?;
        LivenessAnalyzer::analyze(&mut cfg);

        println!("FUNCTION<{}>:", func.name);
        for block in cfg.nodes() {
            let label = block.label.as_ref().map_or(String::new(), |l| format!(" {l}"));
            let reachable = if cfg.is_reachable(block.id) { "" } else { " (unreachable)" };
            println!("  block {}{label} {:?}{reachable}", block.id, block.kind);
            println!("    succ: {:?}", cfg.succ(block.id));
            println!("    live in: {:?}", block.live_in);
            for loc in block.all_seq() {
                println!("      {}", loc.instr);
            }
            println!("    live out: {:?}", block.live_out);
        }
    }
    Ok(())
}
