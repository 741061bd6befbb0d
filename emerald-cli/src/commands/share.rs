use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use emerald_core::ShareState;

use crate::config::Config;
use crate::error::CliError;

pub const DEFAULT_SHARE_BASE: &str = "https://emerald.example/";

#[derive(Subcommand, Debug, Clone)]
pub enum ShareAction {
    /// Decode a shared URL or query string
    Decode {
        /// URL or query string
        url: String,
    },

    /// Build a shareable URL from alignment parameters
    Encode(EncodeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct EncodeArgs {
    /// UniProt accession of sequence A
    #[arg(long)]
    pub seq_a: Option<String>,

    /// UniProt accession of sequence B
    #[arg(long)]
    pub seq_b: Option<String>,

    #[arg(long)]
    pub alpha: Option<f64>,

    #[arg(long)]
    pub delta: Option<f64>,

    #[arg(long)]
    pub gap_cost: Option<f64>,

    #[arg(long)]
    pub start_gap: Option<f64>,

    #[arg(long)]
    pub cost_matrix_type: Option<u8>,

    /// Base URL the query string is appended to
    #[arg(long, default_value = DEFAULT_SHARE_BASE)]
    pub base: String,
}

pub fn execute(_config: &Config, action: ShareAction) -> Result<()> {
    let output = match action {
        ShareAction::Decode { url } => decode(&url)?,
        ShareAction::Encode(args) => encode(&args)?,
    };
    println!("{}", output);
    Ok(())
}

/// Decoded state as pretty JSON. Invalid parameters are dropped, not fatal.
pub fn decode(url: &str) -> Result<String> {
    let state = ShareState::parse(url);
    if state.is_empty() {
        log::warn!("No valid share parameters found in '{}'", url);
    }
    serde_json::to_string_pretty(&state).context("Failed to serialize share state")
}

/// Every argument must survive a parse of the encoded URL; anything the
/// decoder would drop is reported instead of silently shared.
pub fn encode(args: &EncodeArgs) -> Result<String> {
    let state = ShareState {
        seq_a: args.seq_a.as_deref().map(str::to_ascii_uppercase),
        seq_b: args.seq_b.as_deref().map(str::to_ascii_uppercase),
        alpha: args.alpha,
        delta: args.delta,
        gap_cost: args.gap_cost,
        start_gap: args.start_gap,
        cost_matrix_type: args.cost_matrix_type,
    };
    let url = state.to_url(&args.base).map_err(|e| CliError::validation(e.to_string()))?;
    let decoded = ShareState::parse(&url);

    let mut rejected = Vec::new();
    if decoded.seq_a != state.seq_a {
        rejected.push("seq-a");
    }
    if decoded.seq_b != state.seq_b {
        rejected.push("seq-b");
    }
    if decoded.alpha != state.alpha {
        rejected.push("alpha");
    }
    if decoded.delta != state.delta {
        rejected.push("delta");
    }
    if decoded.gap_cost != state.gap_cost {
        rejected.push("gap-cost");
    }
    if decoded.start_gap != state.start_gap {
        rejected.push("start-gap");
    }
    if decoded.cost_matrix_type != state.cost_matrix_type {
        rejected.push("cost-matrix-type");
    }
    if !rejected.is_empty() {
        return Err(CliError::validation(format!("Invalid share parameters: {}", rejected.join(", "))).into());
    }
    Ok(url)
}
