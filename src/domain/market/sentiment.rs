//! Sentiment tools: news sentiment and social media activity.

use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{
    handler_fn, str_param, InputSchema, ParamKind, ParamSpec, ToolFailure, ToolOutput, ToolSpec,
};

use super::generators::{MockMarketData, SentimentData};
use super::{ticker_param, ToolBinding};

pub const ANALYZE_NEWS_SENTIMENT: &str = "analyze_news_sentiment";
pub const SOCIAL_MEDIA_TRENDS: &str = "social_media_trends";

pub const DEFAULT_LOOKBACK_DAYS: u64 = 7;

pub fn news_sentiment_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        ANALYZE_NEWS_SENTIMENT,
        "Analyze sentiment from recent news articles and press releases.",
        InputSchema::new()
            .with_param(ticker_param("\"AMZN\" for Amazon"))
            .with_param(
                ParamSpec::optional("days", ParamKind::Integer, "Number of days to look back for news")
                    .with_default(json!(DEFAULT_LOOKBACK_DAYS)),
            ),
    )
}

pub fn social_media_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        SOCIAL_MEDIA_TRENDS,
        "Analyze social media mentions and sentiment trends.",
        InputSchema::new().with_param(ticker_param("\"GME\" for GameStop")),
    )
}

pub fn news_report(data: &SentimentData, days: u64) -> String {
    format!(
        "News Sentiment Analysis for {} (Last {} days):\n\
         \n\
         Sentiment Scores:\n\
         - News Sentiment: {:.2} (-1 to +1 scale)\n\
         - Social Media: {:.2}\n\
         - Analyst Sentiment: {:.2}\n\
         - Overall Sentiment: {:.2}\n\
         \n\
         Sentiment Trend: {}\n\
         News Volume: {} articles\n\
         \n\
         Key Themes: {}",
        data.ticker,
        days,
        data.news_sentiment,
        data.social_sentiment,
        data.analyst_sentiment,
        data.overall_sentiment,
        data.sentiment_trend,
        data.news_volume,
        data.key_themes.join(", "),
    )
}

/// Social activity drawn alongside the sentiment data.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialActivity {
    pub mentions: u32,
    /// Fraction, 0.02 to 0.15.
    pub engagement: f64,
    pub viral_topics: Vec<&'static str>,
}

impl SocialActivity {
    pub fn draw(source: &MockMarketData, data: &SentimentData) -> Self {
        Self {
            mentions: source.integer(100, 5000),
            engagement: source.uniform(0.02..0.15),
            viral_topics: source.sample(&data.key_themes, 2),
        }
    }
}

pub fn social_report(data: &SentimentData, activity: &SocialActivity) -> String {
    let social = data.social_sentiment;
    format!(
        "Social Media Analysis for {}:\n\
         \n\
         Activity Metrics:\n\
         - Total Mentions: {}\n\
         - Engagement Rate: {:.1}%\n\
         - Sentiment Trend: {}\n\
         \n\
         Sentiment Breakdown:\n\
         - Positive: {:.0}%\n\
         - Negative: {:.0}%\n\
         - Neutral: {:.0}%\n\
         \n\
         Viral Topics: {}",
        data.ticker,
        activity.mentions,
        activity.engagement * 100.0,
        data.sentiment_trend,
        (social * 50.0 + 50.0).max(0.0),
        (-social * 50.0 + 50.0).max(0.0),
        100.0 - (social * 100.0).abs(),
        activity.viral_topics.join(", "),
    )
}

pub fn tools(source: Arc<MockMarketData>) -> Result<Vec<ToolBinding>, ValidationError> {
    let news = source.clone();
    let social = source;
    Ok(vec![
        (
            news_sentiment_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                let days = input
                    .get("days")
                    .and_then(|days| days.as_u64())
                    .ok_or_else(|| ToolFailure::new("parameter 'days' must be a non-negative integer"))?;
                Ok(ToolOutput::text(news_report(&news.sentiment(ticker), days)))
            }),
        ),
        (
            social_media_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                let data = social.sentiment(ticker);
                let activity = SocialActivity::draw(&social, &data);
                Ok(ToolOutput::text(social_report(&data, &activity)))
            }),
        ),
    ])
}
