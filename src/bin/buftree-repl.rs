// =====================================================================
// File: bin/buftree-repl.rs
//
// Description:
//   A small REPL that exercises the buffered tree end to end, reading
//   `PUT`/`GET`/`DEL`/`EXIT` commands from standard input. This binary
//   carries no persistence of its own: every run starts from an empty
//   tree. Run with `RUST_LOG=buftree=trace` to see the tree's internal
//   structural events (container/node splits, reflow).
// =====================================================================

use std::io::{self, BufRead, Write};

use buftree::{Options, Tree};
use clap::Parser;

/// Interactive command shell for a buffered search tree.
#[derive(Parser, Debug)]
#[command(name = "buftree-repl", about = "Interactive shell for the buftree index")]
struct Cli {
    /// Suppress the `buftree> ` prompt (useful when piping scripted input).
    #[arg(long)]
    no_prompt: bool,
}

enum CommandResult {
    Continue,
    Exit,
}

fn handle_line(tree: &mut Tree<String, String, impl buftree::Comparator<String>>, line: &str) -> CommandResult {
    let mut parts = line.trim().splitn(3, ' ');
    match parts.next().unwrap_or("").to_ascii_uppercase().as_str() {
        "PUT" => {
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                println!("ERR usage: PUT <key> <value>");
                return CommandResult::Continue;
            };
            tree.put(key.to_string(), value.to_string());
            println!("OK");
        }
        "GET" => {
            let Some(key) = parts.next() else {
                println!("ERR usage: GET <key>");
                return CommandResult::Continue;
            };
            match tree.get(&key.to_string()) {
                Some(value) => println!("{value}"),
                None => println!("(nil)"),
            }
        }
        "DEL" => {
            let Some(key) = parts.next() else {
                println!("ERR usage: DEL <key>");
                return CommandResult::Continue;
            };
            tree.del(key.to_string());
            println!("OK");
        }
        "EXIT" | "QUIT" => return CommandResult::Exit,
        "" => {}
        other => println!("ERR unknown command: {other}"),
    }
    CommandResult::Continue
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let opts = Options::new(|a: &String, b: &String| a.cmp(b));
    let mut tree = Tree::create(opts).expect("default options are always valid");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !cli.no_prompt {
            print!("buftree> ");
            let _ = io::stdout().flush();
        }
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        match handle_line(&mut tree, &line) {
            CommandResult::Continue => continue,
            CommandResult::Exit => break,
        }
    }

    tree.destroy();
}
