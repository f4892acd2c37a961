use anyhow::Result;
use clap::{Parser, Subcommand};

use risc8::{
    assembler::{assemble, AssemblyArgs},
    emulator::{commands, emulate, run, CommandsArgs, EmulationArgs, RunArgs},
    instrumentation,
};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[clap(long, global = true)]
    #[clap(help = "Enable chrome tracing")]
    #[clap(long_help = "Enable chrome tracing which on program exit will generate
a json file to be opened with a chrome tracing compatible
viewer.")]
    trace: bool,
    #[clap(long, global = true)]
    #[clap(help = "Log debug events to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = "Assemble a program and print its listing")]
    #[clap(aliases = &["a", "asm"])]
    Assemble(AssemblyArgs),
    #[clap(about = "Run a program to completion")]
    #[clap(aliases = &["r"])]
    Run(RunArgs),
    #[clap(about = "Debug a program in the terminal emulator")]
    #[clap(aliases = &["e", "emu"])]
    Emulate(EmulationArgs),
    #[clap(about = "List the commands of a command set")]
    Commands(CommandsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _trace_guard = instrumentation::init(cli.trace, cli.verbose);

    match &cli.command {
        Command::Assemble(args) => assemble(args),
        Command::Run(args) => run(args),
        Command::Emulate(args) => emulate(args),
        Command::Commands(args) => commands(args),
    }
}
