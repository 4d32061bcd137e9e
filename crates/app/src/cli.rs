use clap::{Args, Parser, ValueEnum};
use keja_core::domain::criteria::RawCriteria;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(long, default_value = "serve")]
    pub mode: Mode,
    #[command(flatten)]
    pub browse: BrowseArgs,
    #[command(flatten)]
    pub token: TokenArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Run the HTTP API.
    Serve,
    /// Page through a running API the way the results list does.
    Browse,
    /// Print a development identity token.
    Token,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BrowseArgs {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    #[arg(long)]
    pub bedrooms: Option<String>,
    #[arg(long)]
    pub bathrooms: Option<String>,
    #[arg(long)]
    pub property_type: Option<String>,
    /// Comma-separated amenity names.
    #[arg(long)]
    pub amenities: Option<String>,
    /// Stop after this many pages even if more remain.
    #[arg(long, default_value_t = 100)]
    pub max_pages: u32,
}

impl BrowseArgs {
    pub fn raw_criteria(&self) -> RawCriteria {
        RawCriteria {
            city: self.city.clone(),
            min_price: self.min_price.clone(),
            max_price: self.max_price.clone(),
            bedrooms: self.bedrooms.clone(),
            bathrooms: self.bathrooms.clone(),
            property_type: self.property_type.clone(),
            amenities: self.amenities.clone(),
            page: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TokenArgs {
    #[arg(long, default_value = "dev-agent")]
    pub subject: String,
    #[arg(long, default_value = "agent")]
    pub role: String,
    #[arg(long, default_value_t = 86_400)]
    pub ttl_secs: i64,
}
