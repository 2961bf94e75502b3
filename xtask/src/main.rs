//! Workspace automation for sqlite-binary.
//!
//! `cargo xtask check` runs the same pipeline CI runs: rustfmt, clippy,
//! the test suite with a raised proptest case count, and a warning-free
//! rustdoc build. The remaining subcommands run one piece of it, or the
//! slower jobs CI leaves out (benchmarks and fuzzing).

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use xshell::{Shell, cmd};

/// Library crate every task targets.
const LIB: &str = "sqlite-binary";

/// Targets declared as `[[bin]]` entries in `fuzz/Cargo.toml`.
const FUZZ_TARGETS: &[&str] = &["decode_token", "binary_roundtrip"];

/// Proptest cases per property under `check`.
///
/// The offset properties compare against an exhaustive scan, so they need
/// more than proptest's default 256 cases to reach tie-heavy inputs.
const CHECK_PROPTEST_CASES: u32 = 2048;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for sqlite-binary")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Lint, test and document the workspace the way CI does
    Check,
    /// rustfmt and clippy with warnings denied
    Lint {
        /// Rewrite sources instead of failing
        #[arg(long)]
        fix: bool,
    },
    /// Unit, property and doc tests of the codec
    Test(TestArgs),
    /// Build rustdoc, with and without default features, denying warnings
    Doc {
        /// Open the docs after building
        #[arg(long)]
        open: bool,
    },
    /// Criterion benchmarks (`encode`, `decode`, `buffer` groups)
    Bench {
        /// Only run benchmarks whose id contains this string
        filter: Option<String>,
    },
    /// Run fuzz targets on nightly with cargo-fuzz
    Fuzz(FuzzArgs),
}

#[derive(Args)]
struct TestArgs {
    /// Cases per proptest property (proptest's default is 256)
    #[arg(long)]
    cases: Option<u32>,
    /// Run only the unit tests inside the library
    #[arg(long)]
    lib_only: bool,
}

#[derive(Args)]
struct FuzzArgs {
    /// Targets to run; all of them when omitted
    targets: Vec<String>,
    /// Seconds to spend on each target
    #[arg(long, default_value_t = 60)]
    seconds: u64,
    /// Print the targets and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace_root()?;
    let sh = Shell::new()?;
    sh.change_dir(&root);

    match cli.task {
        Task::Check => {
            lint(&sh, false)?;
            test(
                &sh,
                &TestArgs {
                    cases: Some(CHECK_PROPTEST_CASES),
                    lib_only: false,
                },
            )?;
            doc(&sh, false)?;
            fuzz_targets_on_disk(&root)?;
            eprintln!("check: ok");
        }
        Task::Lint { fix } => lint(&sh, fix)?,
        Task::Test(args) => test(&sh, &args)?,
        Task::Doc { open } => doc(&sh, open)?,
        Task::Bench { filter } => bench(&sh, filter.as_deref())?,
        Task::Fuzz(args) => fuzz(&sh, &root, &args)?,
    }
    Ok(())
}

/// The xtask manifest sits one directory below the workspace root.
fn workspace_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask manifest has no parent directory")
}

/// Run `f` as a named step, reporting how long it took.
fn step(name: &str, f: impl FnOnce() -> Result<()>) -> Result<()> {
    eprintln!("==> {name}");
    let started = Instant::now();
    f().with_context(|| format!("step `{name}` failed"))?;
    eprintln!("    {name} finished in {:.1?}", started.elapsed());
    Ok(())
}

fn lint(sh: &Shell, fix: bool) -> Result<()> {
    if fix {
        step("rustfmt (fix)", || Ok(cmd!(sh, "cargo fmt --all").run()?))?;
        return step("clippy (fix)", || {
            Ok(cmd!(sh, "cargo clippy --workspace --all-targets --fix --allow-dirty").run()?)
        });
    }

    step("rustfmt", || Ok(cmd!(sh, "cargo fmt --all -- --check").run()?))?;
    step("clippy", || {
        Ok(cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?)
    })
}

fn test(sh: &Shell, args: &TestArgs) -> Result<()> {
    // proptest picks its case count up from the environment
    let _cases = args
        .cases
        .map(|n| sh.push_env("PROPTEST_CASES", n.to_string()));

    if args.lib_only {
        return step("unit tests", || Ok(cmd!(sh, "cargo test -p {LIB} --lib").run()?));
    }

    let label = match args.cases {
        Some(n) => format!("tests ({n} proptest cases)"),
        None => "tests".to_owned(),
    };
    step(&label, || Ok(cmd!(sh, "cargo test --workspace --all-targets").run()?))?;
    // --all-targets leaves doctests out
    step("doctests", || Ok(cmd!(sh, "cargo test -p {LIB} --doc").run()?))
}

fn doc(sh: &Shell, open: bool) -> Result<()> {
    let _flags = sh.push_env("RUSTDOCFLAGS", "-D warnings");

    step("rustdoc (no default features)", || {
        Ok(cmd!(sh, "cargo doc -p {LIB} --no-deps --no-default-features").run()?)
    })?;
    let open = open.then_some("--open");
    step("rustdoc", || {
        Ok(cmd!(sh, "cargo doc -p {LIB} --no-deps --all-features {open...}").run()?)
    })
}

fn bench(sh: &Shell, filter: Option<&str>) -> Result<()> {
    step("criterion", || {
        Ok(cmd!(sh, "cargo bench -p {LIB} --bench binary -- {filter...}").run()?)
    })
}

fn fuzz(sh: &Shell, root: &Path, args: &FuzzArgs) -> Result<()> {
    fuzz_targets_on_disk(root)?;

    if args.list {
        for target in FUZZ_TARGETS {
            println!("{target}");
        }
        return Ok(());
    }

    let selected: Vec<&str> = if args.targets.is_empty() {
        FUZZ_TARGETS.to_vec()
    } else {
        args.targets.iter().map(String::as_str).collect()
    };
    for target in &selected {
        ensure!(
            FUZZ_TARGETS.contains(target),
            "unknown fuzz target `{target}` (known: {})",
            FUZZ_TARGETS.join(", ")
        );
    }

    let budget = format!("-max_total_time={}", args.seconds);
    for target in selected {
        step(&format!("fuzz {target} for {}s", args.seconds), || {
            Ok(cmd!(sh, "cargo +nightly fuzz run {target} -- {budget}").run()?)
        })?;
    }
    Ok(())
}

/// Fail when `fuzz/fuzz_targets` and [`FUZZ_TARGETS`] have drifted apart.
fn fuzz_targets_on_disk(root: &Path) -> Result<()> {
    let dir = root.join("fuzz").join("fuzz_targets");
    let mut on_disk = BTreeSet::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.extension().is_some_and(|ext| ext == "rs") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            on_disk.insert(stem.to_owned());
        }
    }

    let declared: BTreeSet<String> = FUZZ_TARGETS.iter().map(|&t| t.to_owned()).collect();
    ensure!(
        on_disk == declared,
        "fuzz targets on disk {on_disk:?} do not match the known list {declared:?}"
    );
    Ok(())
}
