use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about = "Keeper and participant driver for the weekly options vault engine")]
pub struct Opt {
    /// Turn on verbose logging
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub sub: Sub,
}

#[derive(Subcommand, Debug)]
pub enum Sub {
    /// Run a multi-week dry run against the in-memory collaborators,
    /// printing the auction/epoch state reached after each week.
    Simulate(SimulateOpt),
}

#[derive(Parser, Debug)]
pub struct SimulateOpt {
    /// Number of weekly epochs to advance through
    #[clap(long, env = "VAULT_KEEPER_WEEKS", default_value_t = 4)]
    pub weeks: u32,

    /// Whether the vault sells calls (true) or puts (false)
    #[clap(long, env = "VAULT_KEEPER_IS_CALL", default_value_t = true)]
    pub is_call: bool,

    /// Starting collateral deposited by the single simulated depositor
    #[clap(long, env = "VAULT_KEEPER_DEPOSIT", default_value_t = 1_000_000)]
    pub deposit_amount: u128,

    /// Size of the single simulated buyer's market order, each week
    #[clap(long, env = "VAULT_KEEPER_BUYER_SIZE", default_value_t = 100_000)]
    pub buyer_order_size: u128,

    /// Underlying spot price fed to the mock pricer
    #[clap(long, env = "VAULT_KEEPER_SPOT", default_value = "2000")]
    pub spot: String,

    /// Annualized volatility fed to the mock pricer
    #[clap(long, env = "VAULT_KEEPER_VOLATILITY", default_value = "0.6")]
    pub volatility: String,

    /// Target option delta for the strike the vault writes
    #[clap(long, env = "VAULT_KEEPER_DELTA", default_value = "0.3")]
    pub delta: String,

    /// Delta offset defining the far side of the auction's price band
    #[clap(long, env = "VAULT_KEEPER_DELTA_OFFSET", default_value = "0.05")]
    pub delta_offset: String,

    /// Fraction of collateral carved out as reserve, not sold as contracts
    #[clap(long, env = "VAULT_KEEPER_RESERVE_RATE", default_value = "0.1")]
    pub reserve_rate: String,

    /// Performance fee charged on gains at each epoch roll
    #[clap(long, env = "VAULT_KEEPER_PERFORMANCE_FEE", default_value = "0.1")]
    pub performance_fee: String,

    /// Withdrawal fee charged on share redemptions
    #[clap(long, env = "VAULT_KEEPER_WITHDRAWAL_FEE", default_value = "0.01")]
    pub withdrawal_fee: String,

    /// Unix timestamp to treat as "now" for the first simulated week;
    /// defaults to the wall clock at process start
    #[clap(long, env = "VAULT_KEEPER_START_TIME")]
    pub start_time: Option<i64>,
}
