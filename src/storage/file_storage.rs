use crate::{
    config::RetroConfig,
    domain::{
        ids::{BoardId, CardId},
        Board, Card, Slug,
    },
    error::{RetroError, Result},
    storage::{BoardRepository, CardRepository},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one JSON document per board and per card
///
/// ```text
/// <root>/.retro/boards/<slug>.json
/// <root>/.retro/cards/<board id>/<card id>.json
/// ```
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const RETRO_DIR: &'static str = ".retro";
    const BOARDS_DIR: &'static str = "boards";
    const CARDS_DIR: &'static str = "cards";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::RETRO_DIR),
        }
    }

    /// Storage below the configured `storage_root`
    pub fn from_config(config: &RetroConfig) -> Self {
        Self::new(&config.storage_root)
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn board_file(&self, slug: &Slug) -> PathBuf {
        self.boards_dir().join(format!("{}.json", slug.as_str()))
    }

    fn cards_dir(&self, board_id: &BoardId) -> PathBuf {
        self.root_path.join(Self::CARDS_DIR).join(board_id.to_string())
    }

    fn card_file(&self, board_id: &BoardId, id: &CardId) -> PathBuf {
        self.cards_dir(board_id).join(format!("{}.json", id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn read_board(path: &Path) -> Result<Board> {
        let contents = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// JSON files directly inside `dir`; empty when the directory is missing
    async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl BoardRepository for FileStorage {
    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(board.slug()), json).await?;
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        for path in Self::json_files(&self.boards_dir()).await? {
            let board = Self::read_board(&path).await?;
            if board.id() == *id {
                return Ok(board);
            }
        }
        Err(RetroError::not_found("Board", id))
    }

    async fn load_board_by_slug(&self, slug: &Slug) -> Result<Board> {
        let path = self.board_file(slug);
        if !path.exists() {
            return Err(RetroError::not_found("Board", slug));
        }
        Self::read_board(&path).await
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool> {
        Ok(self.board_file(slug).exists())
    }
}

#[async_trait]
impl CardRepository for FileStorage {
    async fn save_card(&self, card: &Card) -> Result<()> {
        self.ensure_directory_exists(&self.cards_dir(&card.board_id))
            .await?;

        let json = serde_json::to_string_pretty(card)?;
        fs::write(self.card_file(&card.board_id, &card.id), json).await?;
        Ok(())
    }

    async fn load_card(&self, board_id: &BoardId, id: &CardId) -> Result<Card> {
        let path = self.card_file(board_id, id);
        if !path.exists() {
            return Err(RetroError::not_found("Card", id));
        }
        let contents = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn delete_card(&self, board_id: &BoardId, id: &CardId) -> Result<()> {
        let path = self.card_file(board_id, id);
        if !path.exists() {
            return Err(RetroError::not_found("Card", id));
        }
        fs::remove_file(path).await?;
        Ok(())
    }

    async fn list_cards(&self, board_id: &BoardId) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        for path in Self::json_files(&self.cards_dir(board_id)).await? {
            let contents = fs::read_to_string(&path).await?;
            let card: Card = serde_json::from_str(&contents)?;
            cards.push(card);
        }
        cards.sort_by_key(|c| c.created_at);
        Ok(cards)
    }
}
