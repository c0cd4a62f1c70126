//! REPL (Read-Eval-Print Loop) for Koy

use crate::interp::{Interpreter, Value};
use crate::parser::{parse_program, parse_statements};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "koy> ";
const HISTORY_FILE: &str = ".koy_history";

/// Interpreter state kept alive between REPL inputs
pub struct Session {
    interpreter: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Session { interpreter }
    }

    /// Evaluate one input.
    ///
    /// Inputs starting with a definition keyword that parse as a program are
    /// installed as top-level definitions and yield `None`; anything else
    /// runs as statements and yields the last value.
    pub fn eval_input(&mut self, input: &str) -> Result<Option<Value>, String> {
        if is_definition(input) {
            if let Ok(program) = parse_program(input) {
                self.interpreter.load(&program).map_err(|e| e.to_string())?;
                return Ok(None);
            }
        }
        let lines = parse_statements(input).map_err(|e| format!("Parse error: {}", e.message()))?;
        self.interpreter
            .interpret_statements(&lines)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    /// Current bindings, one `kind name = value` line each
    pub fn describe_bindings(&self) -> Vec<String> {
        let interp = &self.interpreter;
        let mut lines = Vec::new();
        for name in interp.variable_names() {
            if let Some(value) = interp.get_value(&name) {
                lines.push(format!("var {name} = {value}"));
            }
        }
        for name in interp.function_names() {
            if let Some(value) = interp.get_function(&name) {
                lines.push(format!("fn {name} = {value}"));
            }
        }
        for name in interp.object_names() {
            if let Some(value) = interp.get_object(&name) {
                lines.push(format!("object {name} = {value}"));
            }
        }
        lines
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn is_definition(input: &str) -> bool {
    ["fn ", "val ", "mutable "]
        .iter()
        .any(|keyword| input.starts_with(keyword))
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;

        // Try to find history file in home directory
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            session: Session::new(),
            history_path,
        };

        // Load history if available
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Koy REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    match self.session.eval_input(line) {
                        Ok(Some(value)) if !value.is_nil() => println!("{value}"),
                        Ok(_) => {}
                        Err(err) => eprintln!("{err}"),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :). Returns true to exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":vars" => {
                for line in self.session.describe_bindings() {
                    println!("{line}");
                }
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }
}

fn print_help() {
    println!("Koy REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :vars           List variables, functions and objects");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Definitions: fn add(x, y) {{ x + y; }}  val limit = 10;");
    println!("  - Statements:  println(add(1, 2));  add[x=1, y=2];");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
