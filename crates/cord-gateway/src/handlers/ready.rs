//! READY handler

use super::HandlerResult;
use crate::events::{DispatchContext, ReadyEvent};
use cord_core::{Decode, User};
use serde::Deserialize;
use serde_json::Value;

/// Log the identity the gateway assigned to this session
pub fn ready(ctx: &mut DispatchContext<'_>, data: &Value, _event: &str) -> HandlerResult<()> {
    let ready = ReadyEvent::deserialize(data)?;
    let user = User::decode(&ready.user, ctx.arena)?;
    let user = user.view(ctx.arena);

    tracing::info!(
        version = ready.v,
        session_id = %ready.session_id,
        user = %user.tag(),
        user_id = user.id(),
        guilds = ready.guilds.len(),
        "Session ready"
    );
    Ok(())
}
