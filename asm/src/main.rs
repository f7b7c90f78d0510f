use color_print::cprintln;
use mozasm::{msg, util, Artifacts, Error};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source files, with or without the `.as` extension
    #[clap(required = true)]
    input: Vec<String>,

    /// Directory for the output files (default: next to each source)
    #[clap(short, long)]
    out_dir: Option<PathBuf>,

    /// Dump the assembled listing
    #[clap(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Mozar Assembler");

    let mut ok = true;
    for input in &args.input {
        match run(input, &args) {
            Ok(true) => {}
            Ok(false) => ok = false,
            Err(err) => {
                cprintln!("<red,bold>error</>: {}", err);
                ok = false;
                if err.is_fatal() {
                    break;
                }
            }
        }
        println!("  ===========");
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Assembles one file. `Ok(false)` means the source had errors.
fn run(input: &str, args: &Args) -> Result<bool, Error> {
    let base = input.strip_suffix(".as").unwrap_or(input);
    let path = format!("{}.as", base);

    println!("1. Read {}", path);
    let source = read(&path)?;

    println!("2. Assemble");
    let asm = match mozasm::assemble(&source) {
        Ok(asm) => asm,
        Err(diags) => {
            msg::dump(&diags, &path, &source);
            if diags.iter().any(|diag| diag.is_fatal()) {
                return Err(Error::MemoryAllocation);
            }
            return Ok(false);
        }
    };
    msg::dump(&asm.warnings, &path, &source);

    println!("3. Write");
    let artifacts = Artifacts::new(&asm);
    for (ext, text) in [
        ("ob", &artifacts.object),
        ("ent", &artifacts.entries),
        ("ext", &artifacts.externs),
    ] {
        if let Some(text) = text {
            let out = output_path(base, args.out_dir.as_deref(), ext);
            write(&out, text)?;
            println!("  > {}", out.display());
        }
    }

    if args.dump {
        util::print_dump(&path, &source, &asm);
    }
    Ok(true)
}

fn read(path: &str) -> Result<String, Error> {
    let mut file = File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    let mut source = String::new();
    file.read_to_string(&mut source)
        .map_err(|e| Error::FileRead(path.to_string(), e))?;
    Ok(source)
}

fn write(path: &Path, text: &str) -> Result<(), Error> {
    let name = path.display().to_string();
    let mut file = File::create(path).map_err(|e| Error::FileCreate(name.clone(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| Error::FileWrite(name, e))
}

fn output_path(base: &str, out_dir: Option<&Path>, ext: &str) -> PathBuf {
    let file = format!("{}.{}", base, ext);
    match out_dir {
        Some(dir) => dir.join(Path::new(&file).file_name().unwrap_or_default()),
        None => PathBuf::from(file),
    }
}
