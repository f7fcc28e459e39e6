//! Command-line interface for the indexer.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::airac;
use crate::cache::Cache;
use crate::config::parse_date;
use crate::diff::diff;
use crate::error::Result;
use crate::fetch::{create_client, fetch_page};
use crate::filter::{filter, Select};
use crate::index::AipIndex;
use crate::pairing::{pairs, SheetPair};
use crate::tree::{TocFolder, TocNode, TocPage};
use crate::types::AipType;

/// eAIP Indexer - Index, select and download AIP pages.
#[derive(Parser)]
#[command(name = "eaip-indexer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Cache directory (default: platform cache directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List cached editions and the current publication cycle.
    Editions {
        /// Restrict to one AIP flavor
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: Option<AipType>,
    },

    /// Import a scraped TOC file into the cache.
    Import {
        /// TOC file as produced by the scraper
        file: PathBuf,

        /// Expected AIP flavor; a mismatch is rejected
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: Option<AipType>,
    },

    /// Show the classified page tree of a cached edition.
    List {
        /// AIP flavor
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: AipType,

        /// Effective date in YYYY-MM-DD format (default: newest cached)
        #[arg(short, long)]
        airac: Option<String>,

        /// Show folders only
        #[arg(long)]
        folders: bool,

        /// Show pages only
        #[arg(long)]
        pages: bool,

        /// Show page numbers
        #[arg(long)]
        num: bool,

        /// Show the tree structure
        #[arg(long)]
        tree: bool,

        /// Show prefixes
        #[arg(long)]
        prefix: bool,

        /// Show titles
        #[arg(long)]
        title: bool,
    },

    /// Select pages by prefix or prefix range.
    Filter {
        /// AIP flavor
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: AipType,

        /// Effective date in YYYY-MM-DD format (default: newest cached)
        #[arg(short, long)]
        airac: Option<String>,

        /// Selection tokens: PREFIX or PREFIX-PREFIX (default: everything)
        select: Vec<Select>,

        /// Group the selection into duplex sheet pairs
        #[arg(long)]
        pairs: bool,
    },

    /// Download the PDF artifacts of selected pages.
    Fetch {
        /// AIP flavor
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: AipType,

        /// Effective date in YYYY-MM-DD format (default: newest cached)
        #[arg(short, long)]
        airac: Option<String>,

        /// Selection tokens: PREFIX or PREFIX-PREFIX (default: everything)
        select: Vec<Select>,

        /// Also download the counterpart side of every sheet
        #[arg(long)]
        pairs: bool,

        /// Re-download artifacts that are already cached
        #[arg(long)]
        refresh: bool,
    },

    /// Compare two cached editions page by page.
    Diff {
        /// AIP flavor
        #[arg(short = 't', long = "type", value_enum)]
        aip_type: AipType,

        /// Effective date of the base edition in YYYY-MM-DD format
        #[arg(short, long)]
        base: String,

        /// Effective date of the target edition (default: newest cached)
        #[arg(short, long)]
        airac: Option<String>,

        /// Selection tokens applied to both editions
        select: Vec<Select>,
    },

    /// Delete downloaded artifacts no cached edition references.
    Purge,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let cache = match cli.cache {
        Some(dir) => Cache::with_dir(dir)?,
        None => Cache::open()?,
    };

    match cli.command {
        Commands::Editions { aip_type } => editions_command(&cache, aip_type),
        Commands::Import { file, aip_type } => import_command(&cache, &file, aip_type),
        Commands::List {
            aip_type,
            airac,
            folders,
            pages,
            num,
            tree,
            prefix,
            title,
        } => {
            let show = Show::new(folders, pages, num, tree, prefix, title);
            list_command(&cache, aip_type, airac.as_deref(), &show)
        }
        Commands::Filter {
            aip_type,
            airac,
            select,
            pairs,
        } => filter_command(&cache, aip_type, airac.as_deref(), &select, pairs),
        Commands::Fetch {
            aip_type,
            airac,
            select,
            pairs,
            refresh,
        } => fetch_command(&cache, aip_type, airac.as_deref(), &select, pairs, refresh),
        Commands::Diff {
            aip_type,
            base,
            airac,
            select,
        } => diff_command(&cache, aip_type, &base, airac.as_deref(), &select),
        Commands::Purge => purge_command(&cache),
    }
}

/// Load and index a cached edition.
fn load_index(cache: &Cache, aip_type: AipType, airac: Option<&str>) -> Result<AipIndex> {
    let airac: Option<NaiveDate> = airac.map(parse_date).transpose()?;
    let entry = cache.get(aip_type, airac)?;
    let doc = cache.load(&entry)?;
    AipIndex::build(&doc)
}

fn editions_command(cache: &Cache, aip_type: Option<AipType>) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    println!(
        "{} {}   {} {}",
        style("Current cycle:").bold(),
        style(airac::current_cycle(today)).green(),
        style("Next cycle:").bold(),
        airac::next_cycle(today)
    );
    println!();

    for entry in cache.list(aip_type)? {
        println!(
            "{}  {}  {}",
            style(format!("{:>3}", entry.aip_type)).cyan(),
            entry.airac,
            entry.path.display()
        );
    }

    Ok(())
}

fn import_command(cache: &Cache, file: &std::path::Path, aip_type: Option<AipType>) -> Result<()> {
    let entry = cache.import(file, aip_type)?;
    println!(
        "{} {} {} as {}",
        style("Imported").bold(),
        style(entry.aip_type).cyan(),
        style(entry.airac).green(),
        entry.path.display()
    );
    Ok(())
}

/// Column selection for the `list` command.
struct Show {
    folders: bool,
    pages: bool,
    num: bool,
    tree: bool,
    prefix: bool,
    title: bool,
}

impl Show {
    fn new(folders: bool, pages: bool, num: bool, tree: bool, prefix: bool, title: bool) -> Self {
        let mut show = Self {
            folders,
            pages,
            num,
            tree,
            prefix,
            title,
        };
        // Without an explicit column selection show the full tree.
        if !(show.prefix || show.title) {
            show.tree = true;
            show.prefix = true;
            show.title = true;
        }
        if !(show.folders || show.pages) {
            show.folders = true;
            show.pages = true;
        }
        show
    }
}

fn list_command(cache: &Cache, aip_type: AipType, airac: Option<&str>, show: &Show) -> Result<()> {
    let index = load_index(cache, aip_type, airac)?;
    list_folder(index.root(), show, &mut Vec::new());
    Ok(())
}

fn list_folder(folder: &TocFolder, show: &Show, indent: &mut Vec<bool>) {
    if show.folders {
        let span = folder.span.map(|s| (s.first, s.last));
        print_line(
            show,
            indent,
            span.map(|(first, last)| format!("{first:4} - {last:4} ")),
            folder.prefix.as_deref(),
            folder.title.as_deref(),
            &folder.name,
        );
    }

    let count = folder.children.len();
    for (position, child) in folder.children.iter().enumerate() {
        indent.push(position + 1 >= count);
        match child {
            TocNode::Folder(child_folder) => list_folder(child_folder, show, indent),
            TocNode::Page(page) => list_page(page, show, indent),
        }
        indent.pop();
    }
}

fn list_page(page: &TocPage, show: &Show, indent: &[bool]) {
    if show.pages {
        print_line(
            show,
            indent,
            Some(format!("    {:4}    ", page.number)),
            Some(&page.prefix),
            page.title.as_deref(),
            &page.name,
        );
    }
}

fn print_line(
    show: &Show,
    indent: &[bool],
    num: Option<String>,
    prefix: Option<&str>,
    title: Option<&str>,
    name: &str,
) {
    let mut line = String::new();

    if show.num {
        line.push_str(num.as_deref().unwrap_or("            "));
    }

    if show.tree {
        let depth = indent.len();
        for (position, last) in indent.iter().enumerate() {
            if position + 1 >= depth {
                line.push_str("+- ");
            } else if *last {
                line.push_str("   ");
            } else {
                line.push_str("|  ");
            }
        }
    }

    if show.prefix {
        if let Some(prefix) = prefix {
            line.push_str(prefix);
            if show.title && title.is_some() {
                line.push_str(": ");
            }
        }
    }

    if show.title {
        if let Some(title) = title {
            line.push_str(title);
        }
    }

    if (show.prefix || show.title) && prefix.is_none() && title.is_none() {
        line.push_str(name);
    }

    println!("{line}");
}

fn filter_command(
    cache: &Cache,
    aip_type: AipType,
    airac: Option<&str>,
    select: &[Select],
    as_pairs: bool,
) -> Result<()> {
    let index = load_index(cache, aip_type, airac)?;
    let pages = filter(&index, select)?;

    if as_pairs {
        print_pairs(&pairs(&index, &pages, true));
        return Ok(());
    }

    for page in &pages {
        match &page.title {
            Some(title) => println!("{}:\t{}", page.prefix, title),
            None => println!("{}", page.prefix),
        }
    }

    Ok(())
}

fn print_pairs(sheet_pairs: &[SheetPair]) {
    let side = |page: Option<&TocPage>| match page {
        Some(page) => page.prefix.clone(),
        None => "---".to_string(),
    };

    for (front, back) in sheet_pairs {
        println!("V  {}", side(front.as_ref()));
        println!("R  {}", side(back.as_ref()));
    }
}

fn fetch_command(
    cache: &Cache,
    aip_type: AipType,
    airac: Option<&str>,
    select: &[Select],
    force_pairs: bool,
    refresh: bool,
) -> Result<()> {
    let index = load_index(cache, aip_type, airac)?;
    let selected = filter(&index, select)?;
    let sheet_pairs = pairs(&index, &selected, force_pairs);

    let mut queue: Vec<&TocPage> = Vec::new();
    for (front, back) in &sheet_pairs {
        queue.extend(front.as_ref());
        queue.extend(back.as_ref());
    }

    let client = create_client()?;
    let data_dir = cache.data_dir()?;

    let pb = ProgressBar::new(queue.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );

    for page in queue {
        pb.set_message(page.prefix.clone());
        if let Err(e) = fetch_page(&client, &data_dir, page, refresh) {
            pb.finish_and_clear();
            return Err(e);
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    println!(
        "{} {} pages to {}",
        style("Fetched").green().bold(),
        sheet_pairs
            .iter()
            .map(|(f, b)| usize::from(f.is_some()) + usize::from(b.is_some()))
            .sum::<usize>(),
        data_dir.display()
    );

    Ok(())
}

fn diff_command(
    cache: &Cache,
    aip_type: AipType,
    base: &str,
    airac: Option<&str>,
    select: &[Select],
) -> Result<()> {
    let base_index = load_index(cache, aip_type, Some(base))?;
    let target_index = load_index(cache, aip_type, airac)?;

    let base_pages = filter(&base_index, select)?;
    let target_pages = filter(&target_index, select)?;

    println!(
        "{} {} -> {}",
        style("Comparing").bold(),
        style(base_index.airac()).green(),
        style(target_index.airac()).green()
    );

    for entry in diff(&base_pages, &target_pages) {
        match entry {
            (None, Some(added)) => {
                println!("{}  {}", style("+").green().bold(), added.prefix);
            }
            (Some(removed), None) => {
                println!("{}  {}", style("-").red().bold(), removed.prefix);
            }
            (Some(changed), Some(_)) => {
                println!("{}  {}", style("~").yellow().bold(), changed.prefix);
            }
            (None, None) => {}
        }
    }

    Ok(())
}

fn purge_command(cache: &Cache) -> Result<()> {
    let removed = cache.purge()?;
    println!("{} {} artifacts", style("Removed").bold(), removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_filter() {
        let cli = Cli::parse_from(["eaip-indexer", "filter", "--type", "vfr", "GEN 2", "AD-ENR"]);

        let Commands::Filter {
            aip_type,
            airac,
            select,
            pairs,
        } = cli.command
        else {
            panic!("expected filter command");
        };
        assert_eq!(aip_type, AipType::Vfr);
        assert!(airac.is_none());
        assert!(!pairs);
        assert_eq!(select.len(), 2);
        assert_eq!(select[0].first, "GEN 2");
        assert_eq!(select[1].first, "AD");
        assert_eq!(select[1].last, "ENR");
    }

    #[test]
    fn test_cli_parse_fetch_with_flags() {
        let cli = Cli::parse_from([
            "eaip-indexer",
            "fetch",
            "--type",
            "ifr",
            "--airac",
            "2023-12-28",
            "--pairs",
            "--refresh",
            "AD 2 EDDC",
        ]);

        let Commands::Fetch {
            aip_type,
            airac,
            pairs,
            refresh,
            ..
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(aip_type, AipType::Ifr);
        assert_eq!(airac.as_deref(), Some("2023-12-28"));
        assert!(pairs);
        assert!(refresh);
    }

    #[test]
    fn test_cli_parse_diff() {
        let cli = Cli::parse_from([
            "eaip-indexer",
            "diff",
            "--type",
            "vfr",
            "--base",
            "2023-11-30",
        ]);

        let Commands::Diff {
            aip_type,
            base,
            airac,
            select,
        } = cli.command
        else {
            panic!("expected diff command");
        };
        assert_eq!(aip_type, AipType::Vfr);
        assert_eq!(base, "2023-11-30");
        assert!(airac.is_none());
        assert!(select.is_empty());
    }

    #[test]
    fn test_cli_parse_global_cache_dir() {
        let cli = Cli::parse_from(["eaip-indexer", "editions", "--cache", "/tmp/aip"]);
        assert_eq!(cli.cache, Some(PathBuf::from("/tmp/aip")));
    }
}
