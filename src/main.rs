use area_packer::allocator::{Allocator, REFERENCE_SHEET, reference_catalog};
use area_packer::render;
use area_packer::types::{ItemType, SheetSize};
use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(
    name = "area_packer",
    about = "Allocate item quantities onto fixed-area sheets (greedy, largest area first)"
)]
struct Cli {
    /// Usable area per sheet (e.g. 800)
    #[arg(long, conflicts_with = "sheet", allow_negative_numbers = true)]
    capacity: Option<f64>,

    /// Sheet dimensions as WxH (default: 20x40)
    #[arg(long)]
    sheet: Option<String>,

    /// Items as WxH:qty (e.g. 5x7:50 3x4.5:70); defaults to the reference catalog
    #[arg(long = "items", num_args = 1..)]
    items: Vec<String>,

    /// Print unit counts per size for each sheet
    #[arg(long)]
    summary: bool,

    /// Print a fill gauge for each sheet
    #[arg(long)]
    gauge: bool,

    /// Print the allocation as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_dimensions(s: &str) -> Result<SheetSize, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    Ok(SheetSize::new(width, height))
}

fn parse_item(s: &str) -> Result<ItemType, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid item '{}', expected WxH:qty", s));
    }
    let dims = parse_dimensions(parts[0])?;
    let quantity = parts[1]
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok(ItemType::new(dims.width, dims.height, quantity))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let allocator = match (cli.capacity, cli.sheet.as_deref()) {
        (Some(capacity), _) => Allocator::new(capacity),
        (None, Some(sheet)) => {
            Allocator::for_sheet(parse_dimensions(sheet).unwrap_or_else(|e| fail(e)))
        }
        (None, None) => Allocator::for_sheet(REFERENCE_SHEET),
    }
    .unwrap_or_else(|e| fail(e));

    let catalog: Vec<ItemType> = if cli.items.is_empty() {
        reference_catalog()
    } else {
        cli.items
            .iter()
            .map(|s| parse_item(s))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| fail(e))
    };

    let allocation = allocator.pack(&catalog).unwrap_or_else(|e| fail(e));

    if cli.json {
        match serde_json::to_string_pretty(&allocation) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
        return;
    }

    let capacity = allocation.capacity;
    for (i, sheet) in allocation.sheets.iter().enumerate() {
        println!("Sheet {}: filled {} / {}", i + 1, sheet.filled_area, capacity);
        if cli.summary {
            print!("{}", render::render_summary(sheet));
        } else {
            let units: Vec<String> = sheet.units.iter().map(|u| u.to_string()).collect();
            println!("  {}", units.join(" "));
        }
        if cli.gauge {
            println!("  {}", render::render_gauge(sheet, capacity));
        }
        println!();
    }

    println!(
        "Summary: {} sheet{} used, {:.1}% waste",
        allocation.sheet_count(),
        if allocation.sheet_count() == 1 { "" } else { "s" },
        allocation.total_waste_percent(),
    );

    if !allocation.residue.is_empty() {
        let residue: Vec<String> = allocation
            .residue
            .iter()
            .map(|r| format!("{}x{}:{}", r.width, r.height, r.quantity))
            .collect();
        println!("Unplaced (larger than a sheet): {}", residue.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("20x40").unwrap(), SheetSize::new(20.0, 40.0));
        assert_eq!(parse_dimensions("3x4.5").unwrap(), SheetSize::new(3.0, 4.5));
        assert!(parse_dimensions("20").is_err());
        assert!(parse_dimensions("20xabc").is_err());
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("3x4.5:70").unwrap(), ItemType::new(3.0, 4.5, 70));
        assert!(parse_item("3x4.5").is_err());
        assert!(parse_item("3x4.5:many").is_err());
    }

    #[test]
    fn test_parse_item_leaves_validation_to_allocator() {
        let item = parse_item("0x4:-1").unwrap();
        assert!(Allocator::new(10.0).unwrap().pack(&[item]).is_err());
    }

    #[test]
    fn test_cli_rejects_capacity_with_sheet() {
        let both = Cli::try_parse_from(["area_packer", "--capacity", "800", "--sheet", "20x40"]);
        assert!(both.is_err());
        let cli =
            Cli::try_parse_from(["area_packer", "--items", "5x7:50", "9x2:3", "-vv"]).unwrap();
        assert_eq!(cli.items.len(), 2);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_negative_capacity_reaches_allocator() {
        let cli = Cli::try_parse_from(["area_packer", "--capacity", "-5"]).unwrap();
        assert_eq!(cli.capacity, Some(-5.0));
        assert!(matches!(
            Allocator::new(-5.0),
            Err(area_packer::AllocError::InvalidCapacity { .. })
        ));
    }
}
