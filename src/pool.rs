use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static POOL_DIR: Dir = include_dir!("src/pools");

/// A named vocabulary the game draws words from.
#[derive(Deserialize, Clone, Debug)]
pub struct WordPool {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordPool {
    pub fn new(file_name: String) -> Self {
        read_pool_from_file(format!("{file_name}.json")).unwrap()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

fn read_pool_from_file(file_name: String) -> Result<WordPool, Box<dyn Error>> {
    let file = POOL_DIR.get_file(file_name).expect("Word pool not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let pool = from_str(file_as_str).expect("Unable to deserialize word pool json");

    Ok(pool)
}
