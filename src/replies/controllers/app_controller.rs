//! # Session Controller
//!
//! The event loop of a replyline session. Reads command lines, turns them
//! into UI events against the page, routes them and hands the resulting
//! actions to the [`ReplyController`].
//!
//! ```text
//! CommandStream ──▶ SessionCommand ──▶ UiEvent ──▶ EventRouter
//!                                                      │
//!                        ┌─────────────────────────────┤
//!                        ▼                             ▼
//!                 local action (await)      remote action (JoinSet task)
//! ```
//!
//! Network actions run as spawned tasks so the session keeps accepting
//! commands while requests are in flight. `wait`, `quit` and end of input
//! join every outstanding task.

use super::ReplyController;
use crate::replies::command::SessionCommand;
use crate::replies::dom::{bindings, Document, NodeId, Selector};
use crate::replies::events::{EventRouter, ReplyAction, UiEvent};
use crate::replies::io::CommandStream;
use crate::replies::models::review_state;
use anyhow::{bail, Result};
use std::io::Write;
use tokio::task::JoinSet;

pub struct AppController<D: Document + 'static, CS: CommandStream, W: Write> {
    controller: ReplyController<D>,
    router: EventRouter,
    commands: CS,
    output: W,
    tasks: JoinSet<()>,
    should_quit: bool,
}

impl<D: Document + 'static, CS: CommandStream, W: Write> AppController<D, CS, W> {
    pub fn new(controller: ReplyController<D>, commands: CS, output: W) -> Self {
        Self {
            controller,
            router: EventRouter::new(),
            commands,
            output,
            tasks: JoinSet::new(),
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &ReplyController<D> {
        &self.controller
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Number of actions still waiting on the network
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Run until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        while !self.should_quit {
            let Some(line) = self.commands.next_line()? else {
                tracing::debug!("End of command input");
                break;
            };
            self.reap_finished();

            match SessionCommand::parse(&line) {
                Ok(Some(command)) => {
                    tracing::debug!("Command: {:?}", command);
                    if let Err(e) = self.execute(command).await {
                        writeln!(self.output, "error: {e:#}")?;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(self.output, "error: {e:#}")?,
            }
        }

        self.wait_all().await;
        self.output.flush()?;
        Ok(())
    }

    /// Execute one session command
    pub async fn execute(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Click(selector) => {
                let event = {
                    let document = self.controller.document();
                    let document = document.lock().await;
                    UiEvent::click(find(&*document, &selector)?)
                };
                self.dispatch(event).await
            }
            SessionCommand::Submit(selector) => {
                let event = {
                    let document = self.controller.document();
                    let document = document.lock().await;
                    UiEvent::submit(form_of(&*document, &selector)?)
                };
                self.dispatch(event).await
            }
            SessionCommand::Type { selector, text } => {
                let document = self.controller.document();
                let mut document = document.lock().await;
                let document = &mut *document;
                let node = find(document, &selector)?;
                let field = if is_text_control(document, node) {
                    node
                } else {
                    match bindings::text_field(document, node) {
                        Some(field) => field,
                        None => bail!("'{selector}' is not a text control"),
                    }
                };
                document.set_value(field, &text);
                Ok(())
            }
            SessionCommand::State(review_id) => {
                let state = {
                    let document = self.controller.document();
                    let document = document.lock().await;
                    review_state(&*document, &review_id)
                };
                match state {
                    Some(state) => writeln!(self.output, "review {review_id}: {state}")?,
                    None => writeln!(self.output, "review {review_id}: not on page")?,
                }
                Ok(())
            }
            SessionCommand::Show => {
                let markup = {
                    let document = self.controller.document();
                    let document = document.lock().await;
                    document.inner_markup(document.root()).unwrap_or_default()
                };
                writeln!(self.output, "{markup}")?;
                Ok(())
            }
            SessionCommand::Wait => {
                self.wait_all().await;
                Ok(())
            }
            SessionCommand::Quit => {
                self.should_quit = true;
                Ok(())
            }
        }
    }

    /// Route an event and perform the resulting action
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        let dispatch = {
            let document = self.controller.document();
            let document = document.lock().await;
            self.router.dispatch(&*document, event)
        };

        let Some(action) = dispatch.action else {
            if !dispatch.prevent_default {
                tracing::debug!("No reply route for {:?}", event.kind);
            }
            return Ok(());
        };

        match action {
            // Confirmation blocks the session, the request does not
            ReplyAction::DeleteReply(reply_id) => {
                if self.controller.confirm_delete(&reply_id) {
                    let controller = self.controller.clone();
                    self.tasks
                        .spawn(async move { controller.delete_confirmed(&reply_id).await });
                }
            }
            action if action.is_remote() => {
                let controller = self.controller.clone();
                self.tasks.spawn(async move { controller.perform(action).await });
            }
            action => self.controller.perform(action).await,
        }
        Ok(())
    }

    /// Join every outstanding action
    pub async fn wait_all(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!("Reply task failed: {}", e);
            }
        }
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                tracing::error!("Reply task failed: {}", e);
            }
        }
    }
}

fn find<D: Document + ?Sized>(document: &D, selector: &Selector) -> Result<NodeId> {
    let matches = document.query_all(document.root(), selector);
    if matches.len() > 1 {
        tracing::debug!("'{}' matches {} elements; using the first", selector, matches.len());
    }
    match matches.first() {
        Some(&node) => Ok(node),
        None => bail!("no element matches '{selector}'"),
    }
}

/// The form a submit applies to: the match itself, or the form around it
fn form_of<D: Document + ?Sized>(document: &D, selector: &Selector) -> Result<NodeId> {
    let node = find(document, selector)?;
    match document.closest(node, &Selector::tag("form")) {
        Some(form) => Ok(form),
        None => bail!("'{selector}' is not inside a form"),
    }
}

fn is_text_control<D: Document + ?Sized>(document: &D, node: NodeId) -> bool {
    match document.tag_name(node) {
        Some("textarea") => true,
        Some("input") => !matches!(
            document.attribute(node, "type"),
            Some("checkbox" | "radio" | "submit" | "button" | "reset" | "file" | "image")
        ),
        _ => false,
    }
}
