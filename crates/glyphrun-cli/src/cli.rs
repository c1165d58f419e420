//! CLI argument definitions using Clap v4

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Glyphrun - shaped glyph runs from the command line
#[derive(Parser, Debug)]
#[command(name = "glyphrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a font's metrics, axes, scripts, features and palettes
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Shape text and print the glyph run with its cluster map
    #[command(alias = "s")]
    Shape(ShapeArgs),
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Font file path (.ttf, .otf, .ttc, .otc)
    pub font_file: PathBuf,

    /// Face index for TTC/OTC collections
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: u32,

    /// Pretty-print the JSON
    #[arg(short, long)]
    pub pretty: bool,
}

/// Arguments for the shape command
#[derive(Parser, Debug)]
pub struct ShapeArgs {
    /// Font file path (.ttf, .otf, .ttc, .otc)
    pub font_file: PathBuf,

    /// Text to shape
    pub text: String,

    /// Face index for TTC/OTC collections
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: u32,

    /// Text direction: ltr, rtl, ttb, btt (guessed from the text if omitted)
    #[arg(short = 'd', long = "direction")]
    pub direction: Option<String>,

    /// Language tag (BCP 47), e.g., en, ar, tr
    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,

    /// Script tag (ISO 15924), e.g., Latn, Arab
    #[arg(short = 'S', long = "script")]
    pub script: Option<String>,

    /// Font feature settings, e.g. "liga=0,+smcp,-kern"
    #[arg(short = 'F', long = "features")]
    pub features: Option<String>,

    /// Variable location, e.g. "wght=700,wdth=80"
    #[arg(short = 'V', long = "variations")]
    pub variations: Option<String>,

    /// Sub-run lengths in characters, e.g. "3,5"; must sum to the text length
    #[arg(short = 'r', long = "runs", value_delimiter = ',')]
    pub run_lengths: Vec<usize>,

    /// Resolve COLR color layers instead of monochrome outlines
    #[arg(short = 'c', long = "color-layers")]
    pub color_layers: bool,

    /// Pretty-print the JSON
    #[arg(short, long)]
    pub pretty: bool,
}
