// Bee CLI:
//   bee <file>       parse, lower, optimize, emit out.ll, compile to an object
//   bee run <file>   parse, lower, optimize, execute in-process (JIT)

use bee::codegen::{self, CodegenError};
use bee::lexer::lex_with_span;
use bee::parser::{ParseError, Parser};
use console::style;
use std::fs;
use std::io::{stdout, Write};
use std::process::{exit, Command};

const IR_FILE: &str = "out.ll";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let (jit, source_path) = match args.len() {
        2 => (false, args[1].as_str()),
        3 if args[1] == "run" => (true, args[2].as_str()),
        _ => {
            print_usage();
            exit(1);
        }
    };

    let source = match fs::read_to_string(source_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "[{}]: cannot read {}: {}",
                style("ERROR").red().bold(),
                source_path,
                e
            );
            exit(1);
        }
    };

    status("Parsing Code...       ");
    let tokens = lex_with_span(&source);
    let mut parser = Parser::new(&tokens);
    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => {
            failure();
            print_parse_error(&source, &e);
            exit(1);
        }
    };
    success();

    status("Generating Bytecode...");
    let cg = match codegen::lower_program(&program) {
        Ok(cg) => cg,
        Err(e) => {
            failure();
            print_codegen_error(&e);
            exit(1);
        }
    };
    if let Err(e) = codegen::verify(&cg).and_then(|()| codegen::optimize(&cg)) {
        failure();
        print_codegen_error(&e);
        cg.dispose();
        exit(1);
    }
    success();

    if jit {
        println!("[{}]: Running Code", style("BEE").blue().bold());
        if let Err(e) = codegen::run_jit(cg) {
            print_codegen_error(&e);
            exit(1);
        }
        println!("[{}]: Code Finished", style("BEE").blue().bold());
    } else {
        status("Compiling Objects...  ");
        if let Err(e) = codegen::write_ir(&cg, IR_FILE) {
            failure();
            print_codegen_error(&e);
            cg.dispose();
            exit(1);
        }
        cg.dispose();
        if let Err(e) = compile_object(IR_FILE) {
            failure();
            eprintln!("[{}]: {}", style("ERROR").red().bold(), e);
            exit(1);
        }
        success();
    }

    println!(
        "[{}]: {}",
        style("BEE").blue().bold(),
        style("Exiting").magenta()
    );
}

fn print_usage() {
    println!(
        "{}\n\nUsage:\n  bee <file>         Compile <file>: emits {} and an object file\n  bee run <file>     Execute <file> in-process via the JIT",
        style("Bee Compiler").cyan().bold(),
        IR_FILE
    );
}

// hand the textual IR to the system clang driver for object emission
fn compile_object(ir_path: &str) -> Result<(), String> {
    let result = Command::new("clang")
        .args(["-c", "-x", "ir", ir_path])
        .status();
    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("clang exited with status: {}", status)),
        Err(e) => Err(format!(
            "failed to execute clang: {}. Is clang in your PATH?",
            e
        )),
    }
}

fn status(message: &str) {
    print!("[{}]: {} ", style("BEE").blue().bold(), message);
    stdout().flush().unwrap();
}

fn success() {
    println!("{}", style("SUCCESS").green().bold());
}

fn failure() {
    println!("{}", style("FAILURE").red().bold());
}

fn print_codegen_error(e: &CodegenError) {
    eprintln!("[{}]: {}", style("ERROR").red().bold(), e);
}

fn print_parse_error(source: &str, e: &ParseError) {
    eprintln!("[{}]: {}", style("ERROR").red().bold(), e.message);
    if e.span.start <= source.len() {
        let line_start = source[..e.span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = source[e.span.start..]
            .find('\n')
            .map(|i| e.span.start + i)
            .unwrap_or(source.len());
        if line_start < line_end {
            eprintln!("{}", style(&source[line_start..line_end]).dim());
            eprintln!(
                "{}{}",
                " ".repeat(e.span.start - line_start),
                style("^").red().bold()
            );
        }
    }
}
