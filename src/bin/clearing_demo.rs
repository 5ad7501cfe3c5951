use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use sealed_bid::bits;
use sealed_bid::config::{load_group_parameters, GroupPreset};
use sealed_bid::group::sample_below;
use sealed_bid::{
    encode_bit, verify_batch, BidCommitment, BitProof, BitStatement, ClearingOutcome,
    ClearingPriceEngine, Element, GroupParameters,
};

const LOG_TARGET: &str = "bin::clearing_demo";

#[derive(Debug, Parser)]
#[command(name = "clearing_demo")]
#[command(about = "Resolve the clearing price of a sealed-bid reverse auction", long_about = None)]
struct Args {
    /// Comma-separated bids, one per participant
    #[arg(long, env = "AUCTION_BIDS", value_delimiter = ',', required = true)]
    bids: Vec<u64>,

    /// Number of bits every bid is encoded with
    #[arg(long, env = "AUCTION_BIT_LENGTH", default_value_t = 16)]
    bit_length: usize,

    /// Built-in group parameters
    #[arg(long, value_enum, env = "AUCTION_GROUP", default_value_t = GroupPreset::Safe256)]
    group: GroupPreset,

    /// JSON file with hex `p`, `q`, `g`, `h`; overrides `--group`
    #[arg(long, env = "AUCTION_PARAMS")]
    params: Option<PathBuf>,

    /// Optional RNG seed for reproducible runs
    #[arg(long, env = "AUCTION_RNG_SEED")]
    rng_seed: Option<u64>,

    /// Also commit to every bid and prove each of its bits
    #[arg(long, env = "AUCTION_PROVE", default_value_t = false)]
    prove: bool,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "AUCTION_LOG_JSON", default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    outcome: ClearingOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    proofs: Option<Vec<ProofReport>>,
}

#[derive(Debug, Serialize)]
struct ProofReport {
    participant: usize,
    commitment: Element,
    bits_proven: usize,
    verified: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json)?;

    let params = match &args.params {
        Some(path) => load_group_parameters(path)
            .with_context(|| format!("failed to load group parameters from {}", path.display()))?,
        None => args.group.params().context("failed to build preset group")?,
    };

    let mut rng = args
        .rng_seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    if args.rng_seed.is_some() {
        warn!(target: LOG_TARGET, "seeded RNG in use; secrets are reproducible");
    }

    let engine = ClearingPriceEngine::new(&params);
    let outcome = engine
        .resolve(&args.bids, args.bit_length, &mut rng)
        .context("clearing price resolution failed")?;
    info!(
        target: LOG_TARGET,
        clearing_price = outcome.clearing_price,
        participants = args.bids.len(),
        "auction cleared"
    );

    let proofs = if args.prove {
        Some(prove_bids(&params, &args.bids, args.bit_length, &mut rng)?)
    } else {
        None
    };

    let report = Report { outcome, proofs };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to encode report")?
    );
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

/// Commit to every bid and attach a bit proof per position.
fn prove_bids(
    params: &GroupParameters,
    bids: &[u64],
    bit_length: usize,
    rng: &mut StdRng,
) -> Result<Vec<ProofReport>> {
    let mut reports = Vec::with_capacity(bids.len());
    for (participant, &bid) in bids.iter().enumerate() {
        let (commitment, _opening) = BidCommitment::commit_random(params, bid, rng)?;
        let statements = bits::to_bits(bid, bit_length)?
            .into_iter()
            .enumerate()
            .map(|(position, bit)| -> Result<BitStatement> {
                let t = sample_below(&mut *rng, params.q())?;
                let s = sample_below(&mut *rng, params.q())?;
                let bit = u8::from(bit);
                let value = encode_bit(params, &t, &s, bit)?;
                let position = position as u64;
                let proof =
                    BitProof::generate(params, &commitment, &value, &t, &s, bit, position, &mut *rng)?;
                Ok(BitStatement {
                    value,
                    proof,
                    position,
                })
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("failed to prove bits of participant {participant}"))?;

        let verified = verify_batch(params, &commitment, &statements);
        if !verified {
            bail!("bit proofs of participant {participant} did not verify");
        }
        info!(target: LOG_TARGET, participant, bits = statements.len(), "bit proofs verified");

        reports.push(ProofReport {
            participant,
            commitment: commitment.value().clone(),
            bits_proven: statements.len(),
            verified,
        });
    }
    Ok(reports)
}
