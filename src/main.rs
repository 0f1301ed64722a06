use std::{fs, path::Path, path::PathBuf, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::Parser;
use classcheck_class_file::{ClassFile, JavaVersion, ParserOptions};
use classcheck_symbols::SymbolTable;

/// Parse and validate JVM class files.
#[derive(Parser)]
#[command(name = "classcheck", version)]
struct Cli {
    /// Class files to check
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Java release whose class file rules apply
    #[arg(long, value_name = "VERSION", default_value_t = JavaVersion::LATEST_SUPPORTED.0)]
    java_version: u16,

    /// Accept preview class files of the target release
    #[arg(long)]
    preview: bool,

    /// Skip name, descriptor and cross-reference validation
    #[arg(long)]
    no_validate: bool,

    /// Do not keep StackMapTable contents
    #[arg(long)]
    no_verify: bool,

    /// Parse as the boot loader would, honouring VM-internal annotations
    #[arg(long)]
    boot: bool,

    /// Parse as a hidden class
    #[arg(long)]
    hidden: bool,

    /// Honour VM-internal annotations whatever the loader
    #[arg(long)]
    force_vm_annotations: bool,

    /// Apply InnerClasses rules that the JVM itself does not enforce
    #[arg(long)]
    strict: bool,

    /// Internal name the class must have, such as java/lang/String
    #[arg(long, value_name = "NAME")]
    expect_name: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn parser_options(&self) -> ParserOptions {
        let options = ParserOptions::new()
            .with_java_version(JavaVersion(self.java_version))
            .with_preview_enabled(self.preview)
            .with_validate(!self.no_validate)
            .with_verifiable(!self.no_verify)
            .with_loader_is_boot_or_platform(self.boot)
            .with_hidden(self.hidden)
            .with_force_allow_vm_annotations(self.force_vm_annotations)
            .with_strict_java_compliance(self.strict);
        match &self.expect_name {
            Some(name) => options.with_requested_name(name.as_str()),
            None => options,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let options = cli.parser_options();
    let symbols = SymbolTable::new();

    let mut failed = false;
    for path in &cli.files {
        if let Err(e) = check(path, &options, &symbols) {
            eprintln!("{}: {:#}", path.display(), e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn check(path: &Path, options: &ParserOptions, symbols: &SymbolTable) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    log::debug!("Checking {} ({} bytes)", path.display(), bytes.len());

    let class_file = match ClassFile::parse(&bytes, options, symbols) {
        Ok(class_file) => class_file,
        Err(e) => bail!("{} [{:?}]", e, e.kind()),
    };
    print_summary(&class_file);
    Ok(())
}

fn print_summary(class_file: &ClassFile) {
    println!("class {}", class_file.class_name());
    println!("  version: {}", class_file.version);
    println!("  flags: {:?}", class_file.access_flags);
    if let Some(super_class) = class_file.super_class() {
        println!("  super: {}", super_class);
    }
    for interface in &class_file.interfaces {
        println!("  implements: {}", interface);
    }
    if let Some(source_file) = class_file.source_file() {
        println!("  source: {}", source_file);
    }

    for field in &class_file.fields {
        println!(
            "  field {} {} {:?}",
            class_file.field_name(field),
            class_file.field_descriptor(field),
            field.access_flags
        );
    }
    for method in &class_file.methods {
        let code_length = method.code().map_or(0, |code| code.code.len());
        println!(
            "  method {}{} {:?} ({} bytes of code)",
            class_file.method_name(method),
            class_file.method_descriptor(method),
            method.access_flags,
            code_length
        );
    }

    let attributes: Vec<&str> = class_file.attributes.names().collect();
    if !attributes.is_empty() {
        println!("  attributes: {}", attributes.join(", "));
    }
}
