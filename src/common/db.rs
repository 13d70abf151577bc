use tracing::info;

use crate::common::errors::Result;
use crate::common::helpers::now;
use crate::follow::follow_user;
use crate::likes::like_post;
use crate::models::models::User;
use crate::posts::create_post;
use crate::store::StorageMut;

pub const DEMO_TEST_ID: &str = "00000000-0000-4000-8000-000000000001";
pub const DEMO_ALICE_ID: &str = "00000000-0000-4000-8000-000000000002";
pub const DEMO_BOB_ID: &str = "00000000-0000-4000-8000-000000000003";

fn demo_user(id: &str, name: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        username: username.to_string(),
        profile_image: None,
        created_at: now(),
    }
}

/// Seeds three users, a short conversation and one follow. Does nothing when
/// the demo users already exist.
pub fn init_demo_data<S>(store: &S) -> Result<()>
where
    S: StorageMut + ?Sized,
{
    if store.get_user(DEMO_TEST_ID)?.is_some() {
        return Ok(());
    }

    store.insert_user(&demo_user(DEMO_TEST_ID, "Test User", "test"))?;
    store.insert_user(&demo_user(DEMO_ALICE_ID, "Alice", "alice"))?;
    store.insert_user(&demo_user(DEMO_BOB_ID, "Bob", "bob"))?;

    let welcome = create_post(
        store,
        DEMO_ALICE_ID,
        "Welcome to my board! Excited to share thoughts here.",
        None,
    )?;
    let reply = create_post(store, DEMO_BOB_ID, "Glad to be here, Alice!", Some(&welcome.id))?;
    create_post(store, DEMO_TEST_ID, "Same here.", Some(&reply.id))?;
    create_post(
        store,
        DEMO_BOB_ID,
        "Hey everyone! Just joined Bord, looking forward to connecting with you all.",
        None,
    )?;

    like_post(store, DEMO_BOB_ID, &welcome.id)?;
    like_post(store, DEMO_TEST_ID, &welcome.id)?;
    follow_user(store, DEMO_TEST_ID, DEMO_BOB_ID)?;

    info!("demo data initialized");
    Ok(())
}
