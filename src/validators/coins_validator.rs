use crate::database::connection::DatabaseError;
use crate::database::enums::Exchange;
use crate::database::repositories::CoinsRepository;
use crate::models::{CoinCreationRequest, CoinMarketDataUpdateRequest, QuoteCoinCreationRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The kind of rule a request violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A coin with the same (symbol, name) already exists or appears twice
    /// in the batch
    DuplicateCoin,

    /// A referenced coin ID does not exist in the registry
    MissingCoinId,

    /// An exchange name outside the supported set
    InvalidExchange,

    /// A market data update targets a coin ID that does not exist
    MissingUpdateId,
}

/// One rule violation with a caller-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// How a failed validation maps onto an HTTP-style outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationCategory {
    BadRequest,
    NotFound,
}

/// Aggregated result of validating a request batch
///
/// Checks never stop at the first problem; every violation in the batch is
/// reported so the caller can fix them all in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub violations: Vec<Violation>,
}

impl ValidationOutcome {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Missing-target violations alone read as NotFound; anything else in
    /// the mix makes the whole batch a BadRequest
    pub fn category(&self) -> ViolationCategory {
        let all_missing_targets = self
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::MissingUpdateId);
        if !self.violations.is_empty() && all_missing_targets {
            ViolationCategory::NotFound
        } else {
            ViolationCategory::BadRequest
        }
    }

    /// All violation messages joined for the response body
    pub fn combined_message(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push(&mut self, kind: ViolationKind, message: String) {
        self.violations.push(Violation::new(kind, message));
    }
}

/// Validates coin-related request batches against the registry
pub struct CoinsValidator {
    coins_repository: Arc<dyn CoinsRepository>,
}

impl CoinsValidator {
    pub fn new(coins_repository: Arc<dyn CoinsRepository>) -> Self {
        Self { coins_repository }
    }

    /// Validate a coin creation batch: in-batch and registry duplicates,
    /// referenced quote coin IDs, exchange names
    pub fn validate_coin_creation_requests(
        &self,
        requests: &[CoinCreationRequest],
    ) -> Result<ValidationOutcome, DatabaseError> {
        let mut outcome = ValidationOutcome::default();

        // Duplicates within the batch itself
        let mut seen: HashMap<_, usize> = HashMap::new();
        for request in requests {
            *seen.entry(request.symbol_name_pair()).or_default() += 1;
        }
        for (pair, count) in &seen {
            if *count > 1 {
                outcome.push(
                    ViolationKind::DuplicateCoin,
                    format!(
                        "Coin {} ({}) appears {} times in the request",
                        pair.symbol, pair.name, count
                    ),
                );
            }
        }

        // Duplicates against the registry, for main coins and any quote
        // coins defined inline by (symbol, name)
        let mut pairs: HashSet<_> = seen.into_keys().collect();
        for request in requests {
            for pair_request in &request.trading_pairs {
                if pair_request.coin_quote.id.is_none() {
                    pairs.insert(pair_request.coin_quote.symbol_name_pair());
                }
            }
        }
        let pairs: Vec<_> = pairs.into_iter().collect();
        for existing in self.coins_repository.get_coins_by_symbol_name_pairs(&pairs)? {
            outcome.push(
                ViolationKind::DuplicateCoin,
                format!(
                    "Coin {} ({}) already exists with ID {}",
                    existing.symbol, existing.name, existing.id
                ),
            );
        }

        // Every coin referenced by ID must exist: an explicit main coin ID
        // or a quote coin referenced by ID
        let referenced_ids: HashSet<i32> = requests
            .iter()
            .filter_map(|r| r.id)
            .chain(
                requests
                    .iter()
                    .flat_map(|r| r.trading_pairs.iter())
                    .filter_map(|p| p.coin_quote.id),
            )
            .collect();
        let mut missing: Vec<i32> = self
            .coins_repository
            .get_missing_coin_ids(&referenced_ids)?
            .into_iter()
            .collect();
        missing.sort_unstable();
        for id in missing {
            outcome.push(
                ViolationKind::MissingCoinId,
                format!("Referenced coin with ID {} does not exist", id),
            );
        }

        // Exchange names must be in the supported set
        for request in requests {
            for name in request.exchange_names() {
                if Exchange::from_str(name).is_none() {
                    outcome.push(
                        ViolationKind::InvalidExchange,
                        format!("Unsupported exchange: {}", name),
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Validate a standalone quote coin batch: duplicate checks only
    pub fn validate_quote_coin_creation_requests(
        &self,
        requests: &[QuoteCoinCreationRequest],
    ) -> Result<ValidationOutcome, DatabaseError> {
        let mut outcome = ValidationOutcome::default();

        let mut seen: HashMap<_, usize> = HashMap::new();
        for request in requests {
            *seen.entry(request.symbol_name_pair()).or_default() += 1;
        }
        for (pair, count) in &seen {
            if *count > 1 {
                outcome.push(
                    ViolationKind::DuplicateCoin,
                    format!(
                        "Coin {} ({}) appears {} times in the request",
                        pair.symbol, pair.name, count
                    ),
                );
            }
        }

        let pairs: Vec<_> = seen.into_keys().collect();
        for existing in self.coins_repository.get_coins_by_symbol_name_pairs(&pairs)? {
            outcome.push(
                ViolationKind::DuplicateCoin,
                format!(
                    "Coin {} ({}) already exists with ID {}",
                    existing.symbol, existing.name, existing.id
                ),
            );
        }

        Ok(outcome)
    }

    /// Validate a market data update batch: every targeted ID must exist
    pub fn validate_market_data_update_requests(
        &self,
        requests: &[CoinMarketDataUpdateRequest],
    ) -> Result<ValidationOutcome, DatabaseError> {
        let mut outcome = ValidationOutcome::default();

        let ids: HashSet<i32> = requests.iter().map(|r| r.id).collect();
        let mut missing: Vec<i32> = self
            .coins_repository
            .get_missing_coin_ids(&ids)?
            .into_iter()
            .collect();
        missing.sort_unstable();
        for id in missing {
            outcome.push(
                ViolationKind::MissingUpdateId,
                format!("Coin with ID {} does not exist", id),
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        Coin, CoinMarketDataUpdate, CoinRef, CoinSymbolNamePair, NewCoin, TradingPairSpec,
    };
    use crate::models::{QuoteCoinRequest, TradingPairRequest};
    use std::sync::Mutex;

    struct InMemoryCoinsRepository {
        coins: Mutex<Vec<Coin>>,
    }

    impl InMemoryCoinsRepository {
        fn with_coins(coins: Vec<Coin>) -> Arc<Self> {
            Arc::new(Self {
                coins: Mutex::new(coins),
            })
        }
    }

    impl CoinsRepository for InMemoryCoinsRepository {
        fn get_all_coins(&self) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self.coins.lock().unwrap().clone())
        }

        fn get_coins_by_ids(&self, ids: &[i32]) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self
                .coins
                .lock()
                .unwrap()
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect())
        }

        fn get_coins_by_symbol_name_pairs(
            &self,
            pairs: &[CoinSymbolNamePair],
        ) -> Result<Vec<Coin>, DatabaseError> {
            Ok(self
                .coins
                .lock()
                .unwrap()
                .iter()
                .filter(|c| pairs.iter().any(|p| p.matches(c)))
                .cloned()
                .collect())
        }

        fn get_missing_coin_ids(
            &self,
            ids: &HashSet<i32>,
        ) -> Result<HashSet<i32>, DatabaseError> {
            let coins = self.coins.lock().unwrap();
            Ok(ids
                .iter()
                .copied()
                .filter(|id| !coins.iter().any(|c| c.id == *id))
                .collect())
        }

        fn coin_exists(&self, id: i32) -> Result<bool, DatabaseError> {
            Ok(self.coins.lock().unwrap().iter().any(|c| c.id == id))
        }

        fn insert_coins(&self, _new_coins: Vec<NewCoin>) -> Result<Vec<Coin>, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }

        fn insert_coin_with_pairs(
            &self,
            _coin_main: CoinRef,
            _pairs: Vec<TradingPairSpec>,
        ) -> Result<i32, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }

        fn update_market_data(
            &self,
            _updates: Vec<CoinMarketDataUpdate>,
        ) -> Result<usize, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }

        fn get_quote_coins_prioritized(&self) -> Result<Vec<Coin>, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }

        fn delete_coin(&self, _id: i32) -> Result<bool, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }

        fn delete_coins_not_referenced_by_trading_pairs(&self) -> Result<usize, DatabaseError> {
            unimplemented!("not needed for validation tests")
        }
    }

    fn coin(id: i32, symbol: &str, name: &str) -> Coin {
        Coin {
            id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            is_fiat: false,
            is_stablecoin: false,
            id_coin_gecko: None,
            category: None,
            quote_coin_priority: None,
            price_usd: None,
            market_cap_usd: None,
        }
    }

    fn creation_request(symbol: &str, name: &str) -> CoinCreationRequest {
        CoinCreationRequest {
            id: None,
            symbol: symbol.to_string(),
            name: name.to_string(),
            is_fiat: false,
            is_stablecoin: false,
            id_coin_gecko: None,
            category: None,
            quote_coin_priority: None,
            trading_pairs: Vec::new(),
        }
    }

    fn pair_with(quote_id: Option<i32>, exchanges: &[&str]) -> TradingPairRequest {
        TradingPairRequest {
            coin_quote: QuoteCoinRequest {
                id: quote_id,
                symbol: "USDT".to_string(),
                name: "Tether".to_string(),
            },
            exchanges: exchanges.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_batch_passes() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(2, "USDT", "Tether")]);
        let validator = CoinsValidator::new(repo);

        let mut request = creation_request("BTC", "Bitcoin");
        request.trading_pairs = vec![pair_with(Some(2), &["Binance"])];

        let outcome = validator
            .validate_coin_creation_requests(&[request])
            .unwrap();
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_existing_coin_is_reported_as_duplicate() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(1, "BTC", "Bitcoin")]);
        let validator = CoinsValidator::new(repo);

        let outcome = validator
            .validate_coin_creation_requests(&[creation_request("BTC", "Bitcoin")])
            .unwrap();

        assert!(!outcome.is_ok());
        assert_eq!(outcome.violations[0].kind, ViolationKind::DuplicateCoin);
        assert_eq!(outcome.category(), ViolationCategory::BadRequest);
    }

    #[test]
    fn test_same_symbol_different_name_is_not_a_duplicate() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(1, "BTC", "Bitcoin")]);
        let validator = CoinsValidator::new(repo);

        let outcome = validator
            .validate_coin_creation_requests(&[creation_request("BTC", "Bitcoin Cash")])
            .unwrap();
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_in_batch_duplicate_is_reported() {
        let repo = InMemoryCoinsRepository::with_coins(Vec::new());
        let validator = CoinsValidator::new(repo);

        let outcome = validator
            .validate_coin_creation_requests(&[
                creation_request("ETH", "Ethereum"),
                creation_request("ETH", "Ethereum"),
            ])
            .unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::DuplicateCoin);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(1, "BTC", "Bitcoin")]);
        let validator = CoinsValidator::new(repo);

        // Duplicate against registry, missing quote ID and bad exchange name
        let mut request = creation_request("BTC", "Bitcoin");
        request.trading_pairs = vec![pair_with(Some(999), &["Kraken"])];

        let outcome = validator
            .validate_coin_creation_requests(&[request])
            .unwrap();

        let kinds: Vec<_> = outcome.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            [
                ViolationKind::DuplicateCoin,
                ViolationKind::MissingCoinId,
                ViolationKind::InvalidExchange,
            ]
        );
        assert!(outcome.combined_message().contains("999"));
        assert!(outcome.combined_message().contains("Kraken"));
    }

    #[test]
    fn test_validation_is_read_only_and_repeatable() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(1, "BTC", "Bitcoin")]);
        let validator = CoinsValidator::new(repo);

        let requests = [creation_request("BTC", "Bitcoin")];
        let first = validator.validate_coin_creation_requests(&requests).unwrap();
        let second = validator.validate_coin_creation_requests(&requests).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_quote_coin_duplicate_check() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(2, "USDT", "Tether")]);
        let validator = CoinsValidator::new(repo);

        let outcome = validator
            .validate_quote_coin_creation_requests(&[QuoteCoinCreationRequest {
                symbol: "USDT".to_string(),
                name: "Tether".to_string(),
                quote_coin_priority: Some(1),
            }])
            .unwrap();

        assert!(!outcome.is_ok());
        assert_eq!(outcome.category(), ViolationCategory::BadRequest);
    }

    #[test]
    fn test_market_data_update_missing_id_maps_to_not_found() {
        let repo = InMemoryCoinsRepository::with_coins(vec![coin(1, "BTC", "Bitcoin")]);
        let validator = CoinsValidator::new(repo);

        let outcome = validator
            .validate_market_data_update_requests(&[
                CoinMarketDataUpdateRequest {
                    id: 1,
                    price_usd: None,
                    market_cap_usd: None,
                },
                CoinMarketDataUpdateRequest {
                    id: 42,
                    price_usd: None,
                    market_cap_usd: None,
                },
            ])
            .unwrap();

        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::MissingUpdateId);
        assert_eq!(outcome.category(), ViolationCategory::NotFound);
    }
}
