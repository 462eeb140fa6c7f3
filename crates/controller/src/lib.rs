use anyhow::Result;
use shared::{
    domain::{ListName, RenderId, UserId},
    protocol::{Action, Choice, Intent, RenderInstruction, RenderTarget},
};
use storage::WordStore;
use tracing::{debug, info};

pub mod session;

pub use session::{EditSession, SessionRegistry};

/// Words shown on the editor screen before the preview is cut off.
const PREVIEW_LIMIT: usize = 25;

/// Orchestrates the word store and the session registry in response to
/// inbound intents, producing one render instruction per intent. All
/// user-shaped failures (blank text, duplicates, stale indices) resolve
/// into the rendered text; only storage faults escalate through `Result`.
#[derive(Clone)]
pub struct ListController {
    store: WordStore,
    sessions: SessionRegistry,
}

impl ListController {
    pub fn new(store: WordStore, sessions: SessionRegistry) -> Self {
        Self { store, sessions }
    }

    /// Handles one inbound intent for `user_id`. `render_id` identifies the
    /// screen (or, for submitted text, the inbound message) the intent
    /// originated from; screens are updated in place when it is known.
    pub async fn handle(
        &self,
        user_id: UserId,
        render_id: Option<RenderId>,
        intent: Intent,
    ) -> Result<RenderInstruction> {
        match intent {
            Intent::ShowMainMenu | Intent::Back => {
                self.sessions.end(user_id);
                self.main_menu(user_id, render_id).await
            }
            Intent::OpenListEditor { list } | Intent::BackToEditor { list } => {
                self.sessions.end(user_id);
                self.editor(user_id, list, render_id, "").await
            }
            Intent::StartAdd { list } => self.start_add(user_id, list, render_id),
            Intent::SubmitAddText { text } => self.submit_add(user_id, render_id, &text).await,
            Intent::RequestRemovalPicker { list } => {
                self.removal_picker(user_id, list, render_id).await
            }
            Intent::RemoveByPosition { list, index } => {
                self.remove_by_position(user_id, list, index, render_id).await
            }
            Intent::ClearList { list } => {
                self.store.clear_list(user_id, list).await?;
                self.editor(user_id, list, render_id, "").await
            }
            Intent::Roll => self.roll(user_id, render_id).await,
        }
    }

    async fn main_menu(
        &self,
        user_id: UserId,
        render_id: Option<RenderId>,
    ) -> Result<RenderInstruction> {
        let a = self.store.list_words(user_id, ListName::A).await?;
        let b = self.store.list_words(user_id, ListName::B).await?;
        let text = format!(
            "Word lists\n\nList A: {} words\nList B: {} words\n\nPick an action:",
            a.len(),
            b.len()
        );
        Ok(RenderInstruction::new(
            target_for(render_id),
            text,
            main_menu_choices(),
        ))
    }

    async fn editor(
        &self,
        user_id: UserId,
        list: ListName,
        render_id: Option<RenderId>,
        suffix: &str,
    ) -> Result<RenderInstruction> {
        let text = format!("{}{suffix}", self.editor_text(user_id, list).await?);
        Ok(RenderInstruction::new(
            target_for(render_id),
            text,
            editor_choices(list),
        ))
    }

    async fn editor_text(&self, user_id: UserId, list: ListName) -> Result<String> {
        let words = self.store.list_words(user_id, list).await?;
        let preview = words
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|w| format!("\u{2022} {w}"))
            .collect::<Vec<_>>()
            .join("\n");
        let preview = if preview.is_empty() {
            "\u{2014} empty \u{2014}".to_string()
        } else {
            preview
        };
        let tail = if words.len() > PREVIEW_LIMIT { "\n\u{2026}" } else { "" };
        Ok(format!(
            "Editing list {list}\n\nWords ({}):\n{preview}{tail}",
            words.len()
        ))
    }

    fn start_add(
        &self,
        user_id: UserId,
        list: ListName,
        render_id: Option<RenderId>,
    ) -> Result<RenderInstruction> {
        self.sessions.start(user_id, list, render_id);
        let text = format!(
            "Adding to list {list}\n\nSend one or more lines; every non-blank line becomes its own word."
        );
        Ok(RenderInstruction::new(
            target_for(render_id),
            text,
            vec![Choice::new("Cancel", Action::Back)],
        ))
    }

    /// Resolves a pending add session with the submitted text. Lines are
    /// processed independently: blanks are dropped silently, duplicates are
    /// counted as skipped, and one bad line never aborts the batch.
    async fn submit_add(
        &self,
        user_id: UserId,
        input_id: Option<RenderId>,
        text: &str,
    ) -> Result<RenderInstruction> {
        let Some(session) = self.sessions.get(user_id) else {
            debug!(user_id = user_id.0, "text received with no active add session");
            return self.main_menu(user_id, None).await;
        };

        let mut added = 0;
        let mut skipped = 0;
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if self.store.add_word(user_id, session.target_list, line).await? {
                added += 1;
            } else {
                skipped += 1;
            }
        }

        info!(
            user_id = user_id.0,
            list = %session.target_list,
            added,
            skipped,
            "bulk add"
        );

        self.sessions.end(user_id);

        let suffix = format!("\n\nAdded: {added}\nSkipped: {skipped}");
        let mut instruction = self
            .editor(user_id, session.target_list, session.anchor, &suffix)
            .await?;
        // The user's own input message is clutter once the tally is on
        // screen; deletion is left to the renderer and may silently fail.
        instruction.cleanup = input_id;
        Ok(instruction)
    }

    async fn removal_picker(
        &self,
        user_id: UserId,
        list: ListName,
        render_id: Option<RenderId>,
    ) -> Result<RenderInstruction> {
        let words = self.store.list_words(user_id, list).await?;
        if words.is_empty() {
            return self
                .editor(user_id, list, render_id, "\n\nNothing to remove.")
                .await;
        }

        let mut choices: Vec<Choice> = words
            .iter()
            .enumerate()
            .map(|(index, word)| Choice::new(word, Action::RemoveAt(list, index)))
            .collect();
        choices.push(Choice::new("Back", Action::BackToEditor(list)));

        let text = format!("Pick a word to remove from list {list}:\n\n(tap a word to remove it)");
        Ok(RenderInstruction::new(target_for(render_id), text, choices))
    }

    /// Position-addressed removal over a re-read view. The view may have
    /// changed since the picker was rendered; an out-of-range index means
    /// exactly that and degrades to a plain editor render with no mutation.
    async fn remove_by_position(
        &self,
        user_id: UserId,
        list: ListName,
        index: usize,
        render_id: Option<RenderId>,
    ) -> Result<RenderInstruction> {
        let words = self.store.list_words(user_id, list).await?;
        let Some(word) = words.get(index) else {
            info!(
                user_id = user_id.0,
                list = %list,
                index,
                len = words.len(),
                "stale removal index, list changed since picker was rendered"
            );
            return self.editor(user_id, list, render_id, "").await;
        };

        let removed = self.store.remove_word(user_id, list, word).await?;
        let suffix = if removed {
            "\n\nRemoved."
        } else {
            "\n\nNot found (already removed?)."
        };
        self.editor(user_id, list, render_id, suffix).await
    }

    async fn roll(&self, user_id: UserId, render_id: Option<RenderId>) -> Result<RenderInstruction> {
        let text = match self.store.pick_pair(user_id).await? {
            Some((from_a, from_b)) => format!("List A: {from_a}\nList B: {from_b}"),
            None => "One of the lists is empty.".to_string(),
        };
        Ok(RenderInstruction::new(
            target_for(render_id),
            text,
            main_menu_choices(),
        ))
    }
}

fn target_for(render_id: Option<RenderId>) -> RenderTarget {
    match render_id {
        Some(render_id) => RenderTarget::Update { render_id },
        None => RenderTarget::New,
    }
}

fn main_menu_choices() -> Vec<Choice> {
    vec![
        Choice::new("Edit list A", Action::EditList(ListName::A)),
        Choice::new("Edit list B", Action::EditList(ListName::B)),
        Choice::new("Roll", Action::Roll),
    ]
}

fn editor_choices(list: ListName) -> Vec<Choice> {
    vec![
        Choice::new("Add words", Action::StartAdd(list)),
        Choice::new("Remove a word", Action::RemovalPicker(list)),
        Choice::new("Clear list", Action::ClearList(list)),
        Choice::new("Back", Action::Back),
    ]
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
