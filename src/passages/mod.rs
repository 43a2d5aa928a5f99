use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use tracing::{debug, warn};

use crate::error::{Error, Result};

static PASSAGE_DIR: Dir = include_dir!("src/passages");

/// Last resort when even the embedded pool is unusable
pub const LAST_RESORT_PASSAGE: &str = "Typing practice improves your skills with every keystroke.";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// easy -> medium -> hard -> easy
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// What the practice screen asks the text source for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRequest {
    pub category: String,
    pub difficulty: Difficulty,
}

impl TextRequest {
    pub fn new(category: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            category: category.into(),
            difficulty,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct CategoryTexts {
    pub name: String,
    pub easy: String,
    pub medium: String,
    pub hard: String,
}

impl CategoryTexts {
    pub fn get(&self, difficulty: Difficulty) -> &str {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

/// Category library: one passage per category and difficulty
#[derive(Deserialize, Clone, Debug)]
pub struct PassageLibrary {
    pub default_category: String,
    pub categories: Vec<CategoryTexts>,
}

impl PassageLibrary {
    pub fn embedded() -> Result<Self> {
        Ok(from_str(read_embedded("library.json")?)?)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Passage for the request. Unknown categories fall back to the default
    /// category.
    pub fn passage(&self, request: &TextRequest) -> Option<&str> {
        self.find(&request.category)
            .or_else(|| self.find(&self.default_category))
            .map(|c| c.get(request.difficulty))
    }

    /// Category after `current`, wrapping around
    pub fn next_category(&self, current: &str) -> String {
        let names = self.category_names();
        let next = names
            .iter()
            .position(|n| *n == current)
            .map_or(0, |idx| (idx + 1) % names.len());

        names
            .get(next)
            .map_or_else(|| self.default_category.clone(), |n| n.to_string())
    }

    fn find(&self, name: &str) -> Option<&CategoryTexts> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Built-in passages used when the text source fails
#[derive(Deserialize, Clone, Debug)]
pub struct FallbackPool {
    pub easy: Vec<String>,
    pub medium: Vec<String>,
    pub hard: Vec<String>,
}

impl FallbackPool {
    pub fn embedded() -> Result<Self> {
        Ok(from_str(read_embedded("fallback.json")?)?)
    }

    pub fn for_difficulty(&self, difficulty: Difficulty) -> &[String] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn choose<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Option<&str> {
        self.for_difficulty(difficulty)
            .choose(rng)
            .map(String::as_str)
    }
}

fn read_embedded(file_name: &str) -> Result<&'static str> {
    PASSAGE_DIR
        .get_file(file_name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| Error::TextUnavailable(format!("{file_name} is not embedded")))
}

/// Where target passages come from
pub trait TextSource {
    fn fetch(&self, request: &TextRequest) -> Result<String>;
}

/// Serves passages from the embedded category library
#[derive(Debug, Clone)]
pub struct LibraryTextSource {
    library: PassageLibrary,
}

impl LibraryTextSource {
    pub fn new(library: PassageLibrary) -> Self {
        Self { library }
    }

    pub fn embedded() -> Result<Self> {
        Ok(Self::new(PassageLibrary::embedded()?))
    }

    pub fn library(&self) -> &PassageLibrary {
        &self.library
    }
}

impl TextSource for LibraryTextSource {
    fn fetch(&self, request: &TextRequest) -> Result<String> {
        self.library
            .passage(request)
            .map(str::to_string)
            .ok_or_else(|| Error::TextUnavailable(request.category.clone()))
    }
}

/// Always serves the same passage, e.g. a custom prompt from the command line
#[derive(Debug, Clone)]
pub struct FixedTextSource(pub String);

impl TextSource for FixedTextSource {
    fn fetch(&self, _request: &TextRequest) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Fetch a passage, recovering locally from any failure or blank answer
pub fn load_passage<R: Rng + ?Sized>(
    source: &dyn TextSource,
    request: &TextRequest,
    rng: &mut R,
) -> String {
    match source.fetch(request) {
        Ok(text) if !text.trim().is_empty() => {
            debug!(category = %request.category, difficulty = %request.difficulty, "passage loaded");
            text
        }
        Ok(_) => {
            warn!(category = %request.category, "text source returned a blank passage");
            fallback_passage(request.difficulty, rng)
        }
        Err(err) => {
            warn!(error = %err, category = %request.category, "text source failed");
            fallback_passage(request.difficulty, rng)
        }
    }
}

/// Uniform pick from the built-in pool for `difficulty`
pub fn fallback_passage<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> String {
    match FallbackPool::embedded() {
        Ok(pool) => pool
            .choose(difficulty, rng)
            .unwrap_or(LAST_RESORT_PASSAGE)
            .to_string(),
        Err(err) => {
            warn!(error = %err, "fallback pool unavailable");
            LAST_RESORT_PASSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FailingSource;

    impl TextSource for FailingSource {
        fn fetch(&self, request: &TextRequest) -> Result<String> {
            Err(Error::TextUnavailable(request.category.clone()))
        }
    }

    #[test]
    fn test_embedded_library_has_all_categories() {
        let lib = PassageLibrary::embedded().unwrap();
        assert_eq!(
            lib.category_names(),
            vec![
                "Technology",
                "Sports",
                "Anime",
                "Horror story",
                "Science",
                "History",
                "Travel",
                "Food"
            ]
        );
        for category in &lib.categories {
            for d in Difficulty::ALL {
                assert!(!category.get(d).trim().is_empty());
            }
        }
    }

    #[test]
    fn test_library_lookup_by_difficulty() {
        let lib = PassageLibrary::embedded().unwrap();
        let easy = lib.passage(&TextRequest::new("Science", Difficulty::Easy));
        assert_eq!(easy, Some("Science explores the natural world."));
        let hard = lib.passage(&TextRequest::new("Science", Difficulty::Hard)).unwrap();
        assert!(hard.starts_with("Modern scientific discovery"));
    }

    #[test]
    fn test_unknown_category_uses_default() {
        let lib = PassageLibrary::embedded().unwrap();
        let text = lib.passage(&TextRequest::new("Knitting", Difficulty::Easy));
        assert_eq!(
            text,
            Some("Technology advances every day. Innovation drives progress.")
        );
    }

    #[test]
    fn test_next_category_wraps() {
        let lib = PassageLibrary::embedded().unwrap();
        assert_eq!(lib.next_category("Technology"), "Sports");
        assert_eq!(lib.next_category("Food"), "Technology");
        assert_eq!(lib.next_category("unknown"), "Technology");
    }

    #[test]
    fn test_difficulty_cycle_and_display() {
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert_eq!(
            serde_json::to_string(&Difficulty::Hard).unwrap(),
            "\"hard\""
        );
    }

    #[test]
    fn test_fallback_pool_sizes() {
        let pool = FallbackPool::embedded().unwrap();
        for d in Difficulty::ALL {
            assert_eq!(pool.for_difficulty(d).len(), 10);
        }
    }

    #[test]
    fn test_load_passage_falls_back_on_error() {
        let pool = FallbackPool::embedded().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let text = load_passage(
            &FailingSource,
            &TextRequest::new("Technology", Difficulty::Medium),
            &mut rng,
        );
        assert!(pool.medium.contains(&text));
    }

    #[test]
    fn test_load_passage_falls_back_on_blank_text() {
        let pool = FallbackPool::embedded().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let source = FixedTextSource("   ".into());
        let text = load_passage(&source, &TextRequest::new("Food", Difficulty::Hard), &mut rng);
        assert!(pool.hard.contains(&text));
    }

    #[test]
    fn test_fixed_source_serves_prompt() {
        let mut rng = StdRng::seed_from_u64(3);
        let source = FixedTextSource("hi there".into());
        let text = load_passage(&source, &TextRequest::new("Food", Difficulty::Easy), &mut rng);
        assert_eq!(text, "hi there");
    }
}
