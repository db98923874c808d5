use serenity::builder::{CreateEmbed, CreateMessage};

/// A set of pre-built embeds shown one at a time
pub struct Page {
    pub pages: Vec<CreateEmbed>,
    pub current_page: usize,
}

impl Page {
    pub fn new(pages: Vec<CreateEmbed>) -> Self {
        Page {
            pages,
            current_page: 0,
        }
    }

    /// Jump to a 1-based page number
    pub fn go_to(&mut self, page_num: usize) -> Result<(), String> {
        if page_num < 1 || page_num > self.pages.len() {
            return Err(format!(
                "❌ Invalid page number. This list has {} page(s)",
                self.pages.len()
            ));
        }
        self.current_page = page_num - 1;
        Ok(())
    }

    pub fn current_embed(&self) -> Option<&CreateEmbed> {
        self.pages.get(self.current_page)
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Create a message with the current embed
    pub fn create_message(&self) -> CreateMessage {
        match self.current_embed() {
            Some(embed) => CreateMessage::default().embed(embed.clone()),
            None => CreateMessage::default().content("Nothing to show."),
        }
    }
}

/// Number of pages needed for `items` entries
pub fn page_count(items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    (items + per_page - 1) / per_page
}
