use chain_core::{ChainConfig, TxLookupLimit};
use clap::Args;

/// Transaction-lookup-index retention policy (distilled §4.5, §6: `txLookupLimit`).
///
/// Modeled as a single flag accepting `all`, `disabled`, or a tail length in blocks, the same
/// three-way choice `TxLookupLimit` itself is a sum type over.
#[derive(Debug, Args, PartialEq, Eq)]
pub struct TxIndexArgs {
    /// Transaction-lookup retention: `all` (index every block), `disabled` (stop indexing new
    /// blocks), or a number of blocks to retain a tail for.
    #[arg(
        long = "tx-lookup-limit",
        help_heading = "Transaction index",
        value_parser = parse_tx_lookup_limit,
        default_value = "all"
    )]
    pub tx_lookup_limit: TxLookupLimit,
}

fn parse_tx_lookup_limit(arg: &str) -> Result<TxLookupLimit, String> {
    match arg {
        "all" => Ok(TxLookupLimit::All),
        "disabled" => Ok(TxLookupLimit::Disabled),
        n => n
            .parse()
            .map(TxLookupLimit::Tail)
            .map_err(|_| format!("invalid tx-lookup-limit: {n}")),
    }
}

impl Default for TxIndexArgs {
    fn default() -> Self {
        Self { tx_lookup_limit: ChainConfig::default().tx_lookup_limit }
    }
}

impl TxIndexArgs {
    pub fn apply(&self, config: &mut ChainConfig) {
        config.tx_lookup_limit = self.tx_lookup_limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct CommandParser<T: Args> {
        #[clap(flatten)]
        args: T,
    }

    #[test]
    fn defaults_to_all() {
        let args = CommandParser::<TxIndexArgs>::parse_from(["chain-node"]).args;
        assert_eq!(args.tx_lookup_limit, TxLookupLimit::All);
    }

    #[test]
    fn parses_a_tail_length() {
        let args =
            CommandParser::<TxIndexArgs>::parse_from(["chain-node", "--tx-lookup-limit", "2350000"])
                .args;
        assert_eq!(args.tx_lookup_limit, TxLookupLimit::Tail(2_350_000));
    }

    #[test]
    fn rejects_garbage() {
        assert!(CommandParser::<TxIndexArgs>::try_parse_from([
            "chain-node",
            "--tx-lookup-limit",
            "not-a-number"
        ])
        .is_err());
    }
}
