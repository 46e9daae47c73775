use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use rust_locator::detector::pairing::{PairAssembler, RowPairs, scan_rows_with_parity};
use rust_locator::detector::{RectangleLocator, ScanConfig};
use rust_locator::logger;
use rust_locator::models::{BitMatrix, Quad};
use rust_locator::tools::{
    bench_limit_from_env, binary_stats, dataset_iter, dataset_root_from_env, load_bit_matrix,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "locate_tool", version, about = "RustLocator CLI tools")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the rectangle around a dark region
    Rectangle {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        seed_size: Option<usize>,
        #[arg(long, requires = "y")]
        x: Option<usize>,
        #[arg(long, requires = "x")]
        y: Option<usize>,
    },
    /// Print finder pairs on one row, or on every scanned row
    Pairs {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        row: Option<usize>,
        #[arg(long)]
        start_from_even: bool,
        /// Read the row right to left (symbol printed upside down)
        #[arg(long, requires = "row")]
        reverse: bool,
    },
    /// Print dark-pixel statistics
    Stats {
        #[arg(long)]
        image: PathBuf,
    },
    /// Run both locators once per image of a dataset
    DatasetBench {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => logger::level_from_env().unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = logger::init_with_level(level) {
        eprintln!("Failed to install logger: {err}");
    }

    match cli.command {
        Command::Rectangle {
            image,
            seed_size,
            x,
            y,
        } => rectangle_cmd(&image, seed_size, x.zip(y)),
        Command::Pairs {
            image,
            row,
            start_from_even,
            reverse,
        } => pairs_cmd(&image, row, start_from_even, reverse),
        Command::Stats { image } => stats_cmd(&image),
        Command::DatasetBench { root, limit } => dataset_bench_cmd(root, limit),
    }
}

fn load(image: &Path) -> Option<BitMatrix> {
    match load_bit_matrix(image) {
        Ok(matrix) => {
            println!(
                "Image: {} ({}x{})",
                image.display(),
                matrix.width(),
                matrix.height()
            );
            Some(matrix)
        }
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image.display(), err);
            None
        }
    }
}

fn print_quad(quad: &Quad) {
    for (name, point) in ["top", "left", "right", "bottom"].iter().zip(quad.points) {
        println!("  {name}: ({:.1}, {:.1})", point.x, point.y);
    }
    let center = quad.center();
    println!("  center: ({:.1}, {:.1})", center.x, center.y);
}

fn rectangle_cmd(image: &Path, seed_size: Option<usize>, seed: Option<(usize, usize)>) {
    let Some(matrix) = load(image) else {
        return;
    };

    let config = ScanConfig::default();
    let seed_size = seed_size.unwrap_or(config.seed_size);
    let (x, y) = seed.unwrap_or((matrix.width() / 2, matrix.height() / 2));
    println!("Seed: ({x}, {y}) size {seed_size}");

    match RectangleLocator::with_seed(&matrix, seed_size, x, y).and_then(|l| l.locate()) {
        Ok(quad) => {
            println!("Rectangle:");
            print_quad(&quad);
        }
        Err(err) => println!("Rectangle: {err}"),
    }
}

fn print_row_pairs(found: &RowPairs) {
    println!("Row {}: {} pairs", found.row, found.pairs.len());
    for (i, pair) in found.pairs.iter().enumerate() {
        println!(
            "  Pair {}: value={} odd={}@{}..{} even={}@{}..{}",
            i,
            pair.value,
            pair.odd.value,
            pair.odd.start,
            pair.odd.end,
            pair.even.value,
            pair.even.start,
            pair.even.end
        );
    }
}

fn pairs_cmd(image: &Path, row: Option<usize>, start_from_even: bool, reverse: bool) {
    let Some(matrix) = load(image) else {
        return;
    };
    let config = ScanConfig::default();

    if let Some(y) = row {
        if y >= matrix.height() {
            eprintln!("Row {} outside image of height {}", y, matrix.height());
            return;
        }
        let bits = if reverse {
            matrix.row(y).reversed()
        } else {
            matrix.row(y)
        };
        let mut assembler = PairAssembler::new(&bits, y, start_from_even, config.max_pairs);
        assembler.assemble();
        println!("State: {:?}", assembler.state());
        println!("Forced offsets: {:?}", assembler.forced_offsets());
        print_row_pairs(&RowPairs {
            row: y,
            pairs: assembler.into_pairs(),
        });
        return;
    }

    let rows: Vec<usize> = (0..matrix.height()).step_by(config.row_step).collect();
    let found = scan_rows_with_parity(&matrix, &rows, &config, start_from_even);
    println!("Scanned {} rows, {} with pairs", rows.len(), found.len());
    for row_pairs in &found {
        print_row_pairs(row_pairs);
    }
}

fn stats_cmd(image: &Path) {
    let Some(matrix) = load(image) else {
        return;
    };
    let stats = binary_stats(&matrix);
    println!(
        "Binary: dark_pixels={} total={} dark_ratio={:.2}% dark_rows={}",
        stats.dark_pixels,
        stats.total_pixels,
        stats.dark_ratio * 100.0,
        stats.dark_rows
    );
}

fn dataset_bench_cmd(root: Option<PathBuf>, limit: Option<usize>) {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let config = ScanConfig::default();

    let mut images = 0usize;
    let mut rectangles = 0usize;
    let mut rows_with_pairs = 0usize;
    let start = Instant::now();

    for path in dataset_iter(&root, limit) {
        let matrix = match load_bit_matrix(&path) {
            Ok(matrix) => matrix,
            Err(err) => {
                eprintln!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };
        images += 1;

        let located = RectangleLocator::with_seed(
            &matrix,
            config.seed_size,
            matrix.width() / 2,
            matrix.height() / 2,
        )
        .and_then(|l| l.locate());
        if located.is_ok() {
            rectangles += 1;
        }

        let rows: Vec<usize> = (0..matrix.height()).step_by(config.row_step).collect();
        rows_with_pairs += scan_rows_with_parity(&matrix, &rows, &config, false).len();
    }

    let elapsed = start.elapsed();
    println!("Dataset: {}", root.display());
    println!("Images: {images}");
    println!("Rectangles located: {rectangles}");
    println!("Rows with pairs: {rows_with_pairs}");
    if images > 0 {
        println!(
            "Time: {:.2?} total, {:.2?} per image",
            elapsed,
            elapsed / images as u32
        );
    }
}
