//! MESSAGE_CREATE handler

use super::HandlerResult;
use crate::events::{Context, DispatchContext};
use cord_core::{Decode, Message};
use serde_json::Value;

/// Decode the message into the arena and hand it to the message callback
///
/// A payload that fails to decode is reported as an error and the callback
/// is not invoked.
pub fn message_create(ctx: &mut DispatchContext<'_>, data: &Value, event: &str) -> HandlerResult<()> {
    let message = Message::decode(data, ctx.arena)?;
    let view = message.view(ctx.arena);

    tracing::debug!(
        event,
        id = view.id().unwrap_or("-"),
        channel_id = view.channel_id().unwrap_or("-"),
        content = view.preview(64),
        "Message received"
    );

    let Some(callback) = ctx.callbacks.message() else {
        tracing::trace!("No message callback registered");
        return Ok(());
    };

    let mut context = Context::new(ctx.outbox, ctx.sequence, event);
    callback(&mut context, &view);
    Ok(())
}
