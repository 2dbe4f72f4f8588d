//! Given steps for message delivery BDD scenarios.

use super::world::{DeliveryWorld, channel, run_async, text_payload};
use cursorlog::broker::domain::{FetchLimit, ReceiverId};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"the message "{text}" is published to channel "{name}""#)]
fn message_published(world: &mut DeliveryWorld, text: String, name: String) -> Result<(), eyre::Report> {
    let target = channel(&name)?;
    let message = run_async(world.broker.publish(&target, text_payload(&text)?))
        .wrap_err_with(|| format!("publish {text:?} to {name:?}"))?;
    world.published.push(message);
    Ok(())
}

#[given(r#"receiver "{receiver}" has fetched new messages from channel "{name}" with limit {limit:u32}"#)]
fn receiver_has_fetched(
    world: &mut DeliveryWorld,
    receiver: String,
    name: String,
    limit: u32,
) -> Result<(), eyre::Report> {
    let target = channel(&name)?;
    let receiver_id = ReceiverId::new(receiver)?;
    run_async(
        world
            .broker
            .fetch_new_for_receiver(&receiver_id, &target, FetchLimit::new(limit)?),
    )
    .wrap_err("initial fetch for receiver")?;
    Ok(())
}
