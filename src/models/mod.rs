pub mod requests;

pub use requests::{
    CoinCreationRequest, CoinMarketDataUpdateRequest, QuoteCoinCreationRequest, QuoteCoinRequest,
    TradingPairCreationRequest, TradingPairRequest,
};
