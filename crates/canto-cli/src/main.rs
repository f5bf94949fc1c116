//! Canto CLI - command-line interface for the Canto compiler.

use std::env;
use std::fs;
use std::path::Path;

use canto::{compile, CodeSections};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const VERSION: &str = "0.4.0";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut eval_code: Option<String> = None;
    let mut file: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-v" | "--version" => {
                print_version();
                return Ok(());
            }
            "-e" | "--eval" => {
                i += 1;
                if i >= args.len() {
                    return Err("-e requires an argument".to_string());
                }
                eval_code = Some(args[i].clone());
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                file = Some(arg.clone());
                break;
            }
        }
        i += 1;
    }

    if let Some(code) = eval_code {
        let sections = compile(&code).map_err(|e| e.to_string())?;
        print!("{}", package(&sections));
    } else if let Some(filepath) = file {
        compile_file(&filepath)?;
    } else {
        start_repl()?;
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"
Canto v{} - Compiler for the Canto language

Usage:
  canto [options] [file]

Options:
  -h, --help      Show this help message
  -v, --version   Show version
  -e, --eval      Compile a snippet from the command line to stdout

Examples:
  canto                    Start interactive compiler session
  canto program.ct         Compile a file to program.ct.gen
  canto -e "x = 1 + 2;"    Show the lowered output of a snippet
"#,
        VERSION
    );
}

fn print_version() {
    println!("Canto {}", VERSION);
}

/// Wrap the lowered sections into a complete target program: imports and
/// function definitions first, then the top-level statements inside a
/// `main` body.
fn package(sections: &CodeSections) -> String {
    let mut out = String::from("import canto_runtime;\n");
    out.push_str(&sections.imports);
    out.push_str(&sections.functions);
    out.push_str("main() {\n");
    out.push_str(&sections.top_level);
    out.push_str("return 0;\n}\n");
    out
}

fn compile_file(filepath: &str) -> Result<(), String> {
    let path = Path::new(filepath);

    if !path.exists() {
        return Err(format!("File not found: {}", filepath));
    }

    let source = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file: {}", e))?;

    let sections = compile(&source).map_err(|e| format!("{}: {}", filepath, e))?;

    let out_path = format!("{}.gen", filepath);
    fs::write(&out_path, package(&sections))
        .map_err(|e| format!("Failed to write {}: {}", out_path, e))?;
    println!("Wrote {}", out_path);
    Ok(())
}

fn start_repl() -> Result<(), String> {
    println!("Canto v{} - Type 'exit' or Ctrl+D to quit", VERSION);
    println!("Statements you enter are compiled and their lowered form shown.");
    println!();

    let mut rl = DefaultEditor::new()
        .map_err(|e| format!("Failed to create editor: {}", e))?;

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    println!("Goodbye!");
                    break;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        rl.add_history_entry(buffer.trim()).ok();

                        match compile(&buffer) {
                            Ok(sections) => {
                                print!("{}", sections.imports);
                                print!("{}", sections.functions);
                                print!("{}", sections.top_level);
                            }
                            Err(report) => {
                                eprintln!("{}", report);
                            }
                        }
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => {
                return Err(format!("Readline error: {}", e));
            }
        }
    }

    Ok(())
}

/// Check if the input is syntactically complete: all delimiters closed,
/// no open string, and the last statement terminated or block closed.
fn is_complete(input: &str) -> bool {
    let mut braces = 0;
    let mut parens = 0;
    let mut brackets = 0;
    let mut in_string = false;

    for c in input.chars() {
        if in_string {
            if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
    }

    braces == 0 && parens == 0 && brackets == 0 && !in_string
}
