//! Mock market data generators.
//!
//! Numbers are drawn uniformly from fixed ranges; they make the analysis tools
//! produce plausible reports without a data vendor. The RNG is injectable so
//! tests can seed it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::ops::Range;
use std::sync::{Mutex, PoisonError};

/// Declares a categorical signal with its raw label and a title-cased display.
macro_rules! signal {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Raw label, as produced by the generator.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", title_case(self.as_str()))
            }
        }
    };
}

signal!(
    /// Result of the most recent earnings release against consensus.
    EarningsSurprise { Beat => "beat", Miss => "miss", Inline => "inline" }
);

signal!(AnalystRating {
    StrongBuy => "Strong Buy",
    Buy => "Buy",
    Hold => "Hold",
    Sell => "Sell",
    StrongSell => "Strong Sell",
});

signal!(Trend { Bullish => "bullish", Bearish => "bearish", Sideways => "sideways" });

signal!(MacdSignal { Bullish => "bullish", Bearish => "bearish", Neutral => "neutral" });

signal!(
    /// Where the price sits within its Bollinger bands.
    BandPosition { Upper => "upper", Middle => "middle", Lower => "lower" }
);

signal!(VolumeTrend { Increasing => "increasing", Decreasing => "decreasing", Stable => "stable" });

signal!(SentimentTrend {
    Improving => "improving",
    Deteriorating => "deteriorating",
    Stable => "stable",
});

signal!(RiskLevel { Low => "low", Medium => "medium", High => "high" });

signal!(ChartPattern {
    AscendingTriangle => "ascending triangle",
    HeadAndShoulders => "head and shoulders",
    DoubleBottom => "double bottom",
    BullFlag => "bull flag",
    Wedge => "wedge",
    ChannelBreakout => "channel breakout",
});

/// Themes sampled into sentiment data.
pub const THEMES: &[&str] = &[
    "earnings growth",
    "market expansion",
    "regulatory concerns",
    "innovation",
    "competition",
    "supply chain",
    "management changes",
];

/// Capitalises the first letter of every word.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Financials {
    pub ticker: String,
    /// USD, 50B to 2T.
    pub market_cap: f64,
    pub pe_ratio: f64,
    /// Fraction, -0.10 to 0.30.
    pub revenue_growth: f64,
    pub profit_margin: f64,
    pub debt_to_equity: f64,
    pub roe: f64,
    pub current_ratio: f64,
    pub earnings_surprise: EarningsSurprise,
    pub analyst_rating: AnalystRating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalData {
    pub ticker: String,
    pub current_price: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub rsi: f64,
    pub macd_signal: MacdSignal,
    pub bollinger_position: BandPosition,
    pub volume_trend: VolumeTrend,
    pub support_level: f64,
    pub resistance_level: f64,
    pub trend: Trend,
}

/// Sentiment scores on a -1 to +1 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentData {
    pub ticker: String,
    pub news_sentiment: f64,
    pub social_sentiment: f64,
    pub analyst_sentiment: f64,
    pub overall_sentiment: f64,
    pub sentiment_trend: SentimentTrend,
    pub key_themes: Vec<&'static str>,
    pub news_volume: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskData {
    pub ticker: String,
    pub beta: f64,
    /// Annualized, 0.15 to 0.60.
    pub volatility: f64,
    /// Daily 95% value at risk, -0.15 to -0.05.
    pub var_95: f64,
    pub correlation_spy: f64,
    pub liquidity_score: f64,
    pub sector_risk: RiskLevel,
    pub regulatory_risk: RiskLevel,
    pub esg_score: f64,
}

/// Sector averages that ratios are compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorBenchmarks {
    pub pe_ratio: f64,
    pub roe: f64,
    pub profit_margin: f64,
}

/// Source of generated market data.
///
/// Shared between tools; draws are serialised through an internal lock.
#[derive(Debug)]
pub struct MockMarketData {
    rng: Mutex<StdRng>,
}

impl MockMarketData {
    /// Deterministic generator for tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Uniform draw from `range`.
    pub fn uniform(&self, range: Range<f64>) -> f64 {
        self.with_rng(|rng| rng.gen_range(range))
    }

    /// Uniform integer draw, both bounds inclusive.
    pub fn integer(&self, low: u32, high: u32) -> u32 {
        self.with_rng(|rng| rng.gen_range(low..=high))
    }

    /// Picks one of `options`.
    pub fn pick<T: Copy>(&self, options: &[T]) -> Option<T> {
        self.with_rng(|rng| options.choose(rng).copied())
    }

    /// Picks `amount` distinct elements of `options`.
    pub fn sample<T: Copy>(&self, options: &[T], amount: usize) -> Vec<T> {
        self.with_rng(|rng| options.choose_multiple(rng, amount).copied().collect())
    }

    pub fn financials(&self, ticker: &str) -> Financials {
        self.with_rng(|rng| Financials {
            ticker: ticker.to_string(),
            market_cap: rng.gen_range(50e9..2e12),
            pe_ratio: rng.gen_range(10.0..35.0),
            revenue_growth: rng.gen_range(-0.1..0.3),
            profit_margin: rng.gen_range(0.05..0.25),
            debt_to_equity: rng.gen_range(0.1..2.0),
            roe: rng.gen_range(0.08..0.25),
            current_ratio: rng.gen_range(1.0..3.0),
            earnings_surprise: choose(rng, EarningsSurprise::ALL),
            analyst_rating: choose(rng, AnalystRating::ALL),
        })
    }

    pub fn technical(&self, ticker: &str) -> TechnicalData {
        self.with_rng(|rng| {
            let current_price = rng.gen_range(50.0..500.0);
            TechnicalData {
                ticker: ticker.to_string(),
                current_price,
                sma_50: current_price * rng.gen_range(0.95..1.05),
                sma_200: current_price * rng.gen_range(0.90..1.10),
                rsi: rng.gen_range(20.0..80.0),
                macd_signal: choose(rng, MacdSignal::ALL),
                bollinger_position: choose(rng, BandPosition::ALL),
                volume_trend: choose(rng, VolumeTrend::ALL),
                support_level: current_price * rng.gen_range(0.85..0.95),
                resistance_level: current_price * rng.gen_range(1.05..1.15),
                trend: choose(rng, Trend::ALL),
            }
        })
    }

    pub fn sentiment(&self, ticker: &str) -> SentimentData {
        self.with_rng(|rng| SentimentData {
            ticker: ticker.to_string(),
            news_sentiment: rng.gen_range(-1.0..1.0),
            social_sentiment: rng.gen_range(-1.0..1.0),
            analyst_sentiment: rng.gen_range(-1.0..1.0),
            overall_sentiment: rng.gen_range(-1.0..1.0),
            sentiment_trend: choose(rng, SentimentTrend::ALL),
            key_themes: THEMES.choose_multiple(rng, 3).copied().collect(),
            news_volume: rng.gen_range(10..=100),
        })
    }

    pub fn risk(&self, ticker: &str) -> RiskData {
        self.with_rng(|rng| RiskData {
            ticker: ticker.to_string(),
            beta: rng.gen_range(0.5..2.0),
            volatility: rng.gen_range(0.15..0.60),
            var_95: rng.gen_range(-0.15..-0.05),
            correlation_spy: rng.gen_range(0.3..0.9),
            liquidity_score: rng.gen_range(0.3..1.0),
            sector_risk: choose(rng, RiskLevel::ALL),
            regulatory_risk: choose(rng, RiskLevel::ALL),
            esg_score: rng.gen_range(30.0..90.0),
        })
    }

    pub fn sector_benchmarks(&self) -> SectorBenchmarks {
        self.with_rng(|rng| SectorBenchmarks {
            pe_ratio: rng.gen_range(15.0..25.0),
            roe: rng.gen_range(0.10..0.20),
            profit_margin: rng.gen_range(0.08..0.18),
        })
    }
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// Every ALL table is non-empty, so the fallback is never taken.
fn choose<T: Copy>(rng: &mut StdRng, options: &[T]) -> T {
    *options.choose(rng).unwrap_or(&options[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalises_each_word() {
        assert_eq!(title_case("head and shoulders"), "Head And Shoulders");
        assert_eq!(title_case("bullish"), "Bullish");
        assert_eq!(title_case("Strong Buy"), "Strong Buy");
    }

    #[test]
    fn signals_display_title_case_and_keep_raw_label() {
        assert_eq!(ChartPattern::BullFlag.to_string(), "Bull Flag");
        assert_eq!(BandPosition::Upper.as_str(), "upper");
        assert_eq!(EarningsSurprise::ALL.len(), 3);
    }

    #[test]
    fn same_seed_same_data() {
        let a = MockMarketData::seeded(42);
        let b = MockMarketData::seeded(42);
        assert_eq!(a.financials("AAPL"), b.financials("AAPL"));
        assert_eq!(a.technical("AAPL"), b.technical("AAPL"));
    }

    #[test]
    fn financials_stay_in_range() {
        let data = MockMarketData::seeded(7);
        for _ in 0..200 {
            let f = data.financials("MSFT");
            assert!((50e9..2e12).contains(&f.market_cap));
            assert!((10.0..35.0).contains(&f.pe_ratio));
            assert!((-0.1..0.3).contains(&f.revenue_growth));
            assert!((1.0..3.0).contains(&f.current_ratio));
        }
    }

    #[test]
    fn technical_levels_bracket_price() {
        let data = MockMarketData::seeded(11);
        for _ in 0..200 {
            let t = data.technical("TSLA");
            assert!(t.support_level < t.current_price);
            assert!(t.resistance_level > t.current_price);
            assert!((20.0..80.0).contains(&t.rsi));
        }
    }

    #[test]
    fn sentiment_themes_are_distinct() {
        let data = MockMarketData::seeded(3);
        for _ in 0..100 {
            let s = data.sentiment("AMZN");
            assert_eq!(s.key_themes.len(), 3);
            assert_ne!(s.key_themes[0], s.key_themes[1]);
            assert_ne!(s.key_themes[1], s.key_themes[2]);
            assert_ne!(s.key_themes[0], s.key_themes[2]);
            assert!((10..=100).contains(&s.news_volume));
        }
    }

    #[test]
    fn value_at_risk_is_a_loss() {
        let data = MockMarketData::seeded(5);
        for _ in 0..200 {
            let r = data.risk("JPM");
            assert!((-0.15..-0.05).contains(&r.var_95));
            assert!((0.5..2.0).contains(&r.beta));
        }
    }
}
