//! Shared configuration constants
//!
//! Default values and wikitext markers used throughout the codebase, kept in
//! one place so the renderer and the merge engine can never disagree.

/// User agent sent with every outbound request
///
/// Nominatim's usage policy rejects anonymous clients, so this must identify
/// the bot and stay stable across releases.
pub const BOT_USER_AGENT: &str = "coffeebot/0.1 (+https://breakfastand.coffee/)";

/// Default MediaWiki action API endpoint
pub const DEFAULT_API_URL: &str = "https://breakfastand.coffee/api.php";

/// Default wiki base URL, used to build canonical page URLs
pub const DEFAULT_BASE_URL: &str = "https://breakfastand.coffee";

/// Default reverse geocoding endpoint
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";

/// Heading that opens the reviews section
pub const REVIEWS_HEADING: &str = "Reviews";

/// Heading that opens the photos section
pub const PHOTOS_HEADING: &str = "Photos";

/// Glyph repeated once per star in rendered ratings
pub const STAR_GLYPH: &str = "⭐";

/// Best possible rating, rendered into every aggregate block
pub const BEST_RATING: u32 = 5;

/// Upper bound on star glyphs drawn for a single rating
///
/// Ratings are not clamped to the best rating, but a page claiming a rating
/// of `1e20` must not allocate a string that size.
pub const MAX_STAR_GLYPHS: usize = 50;

/// Template transcluded after the aggregate block
pub const ADD_YOURSELF_TEMPLATE: &str = "{{addyourself}}";

/// Category every recipe page joins
pub const RECIPES_CATEGORY: &str = "Recipes";
