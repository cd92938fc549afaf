use crate::services::db_service::UserStore;
use crate::{Error, Result};
use log::info;
use mongodb::bson::oid::ObjectId;

/// Block/unblock semantics over the actor's `blocked_users` set.
///
/// Both operations write only the actor's document; the target is read
/// for existence and never modified. The existence check and the set
/// mutation are two independent store calls, so a target deleted in
/// between is not re-validated (search still excludes by id either way).
pub struct RelationshipService {
    store: UserStore,
}

impl RelationshipService {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }

    pub async fn block(&self, actor: &ObjectId, target_id: &str) -> Result<()> {
        let target = resolve_block_target(actor, target_id)?;

        self.store
            .find_by_id(&target)
            .await?
            .ok_or_else(|| Error::NotFound("no user found to block".to_string()))?;

        // $addToSet: re-blocking an already-blocked user is a no-op
        self.store.add_blocked(actor, &target).await?;

        info!("user {} blocked {}", actor.to_hex(), target_id);

        Ok(())
    }

    pub async fn unblock(&self, actor: &ObjectId, target_id: &str) -> Result<()> {
        let target = parse_user_id(target_id)?;

        self.store
            .find_by_id(&target)
            .await?
            .ok_or_else(|| Error::NotFound("No user found to unblock".to_string()))?;

        // $pull: removing a non-member is still success
        self.store.remove_blocked(actor, &target).await?;

        info!("user {} unblocked {}", actor.to_hex(), target_id);

        Ok(())
    }
}

/// Parses the block target and rejects self-blocks before any store
/// access, whether or not the actor still resolves. Comparing parsed
/// ids keeps non-canonical hex spellings of the actor's own id from
/// slipping past the guard.
fn resolve_block_target(actor: &ObjectId, target_id: &str) -> Result<ObjectId> {
    let target = parse_user_id(target_id)?;

    if &target == actor {
        return Err(Error::BadRequest("Cannot block yourself".to_string()));
    }

    Ok(target)
}

fn parse_user_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| Error::BadRequest(format!("invalid user id '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_id_accepts_object_ids() {
        let id = ObjectId::new();
        assert_eq!(parse_user_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_user_id_rejects_garbage() {
        assert!(matches!(
            parse_user_id("not-an-id"),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(parse_user_id(""), Err(Error::BadRequest(_))));
    }

    #[test]
    fn self_block_is_rejected_for_canonical_id() {
        let actor = ObjectId::new();

        assert!(matches!(
            resolve_block_target(&actor, &actor.to_hex()),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn self_block_is_rejected_for_uppercase_hex_id() {
        let actor = ObjectId::new();
        let upper = actor.to_hex().to_uppercase();

        // Uppercase hex still parses to the same id, so the guard must
        // compare ids, not strings
        assert_ne!(upper, actor.to_hex());
        assert_eq!(parse_user_id(&upper).unwrap(), actor);
        assert!(matches!(
            resolve_block_target(&actor, &upper),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn distinct_target_resolves_to_its_id() {
        let actor = ObjectId::new();
        let target = ObjectId::new();

        assert_eq!(
            resolve_block_target(&actor, &target.to_hex()).unwrap(),
            target
        );
    }
}
