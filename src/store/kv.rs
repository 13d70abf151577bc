use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use spin_sdk::key_value::Store;

use crate::common::errors::{Error, Result};
use crate::config::*;
use crate::models::models::{Follow, Like, Post, User, UserSummary};
use crate::store::lists;
use crate::store::{Storage, StorageMut};
use crate::thread::ordering::{sort_replies, sort_roots};

/// Spin key-value backed storage.
///
/// Layout: `user:{id}` and `post:{id}` hold entities and `users_list` the
/// user ids in creation order. `roots` lists root post ids newest first,
/// `replies:{id}` child ids in insertion order and `user_posts:{id}` an
/// author's post ids newest first. `likes:{post_id}` holds the likes of a
/// post, `user_likes:{user_id}` the posts a user liked. `followings:{id}`
/// holds a user's follows and `followers:{id}` the ids following them.
pub struct KvStore {
    store: Store,
}

impl KvStore {
    pub fn new(store: Store) -> Self {
        KvStore { store }
    }

    pub fn open_default() -> Result<Self> {
        Store::open_default().map(KvStore::new).map_err(Error::storage)
    }

    fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.store.get_json::<Vec<T>>(key)?.unwrap_or_default())
    }

    /// Loads the list at `key`, applies `edit` and writes it back when it
    /// reports a change. Empty lists are deleted.
    fn edit<T, F>(&self, key: &str, edit: F) -> Result<bool>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        let mut items = self.list::<T>(key)?;
        if !edit(&mut items) {
            return Ok(false);
        }
        if items.is_empty() {
            self.delete(key)?;
        } else {
            self.store.set_json(key, &items)?;
        }
        Ok(true)
    }

    fn posts_by_id(&self, ids: &[String]) -> Result<Vec<Post>> {
        let mut posts = Vec::with_capacity(ids.len());
        for id in ids {
            // A dangling id means the post was removed mid-way; skip it.
            if let Some(p) = self.get_post(id)? {
                posts.push(p);
            }
        }
        Ok(posts)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.store.exists(key).map_err(Error::storage)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).map_err(Error::storage)
    }
}

impl Storage for KvStore {
    fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        Ok(self.store.get_json::<Post>(&post_key(post_id))?)
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.store.get_json::<User>(&user_key(user_id))?)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        for id in self.list::<String>(USERS_LIST_KEY)? {
            if let Some(user) = self.get_user(&id)? {
                users.push(user);
            }
        }
        Ok(users)
    }

    fn list_children(&self, post_id: &str) -> Result<Vec<Post>> {
        let ids = self.list::<String>(&replies_key(post_id))?;
        let mut children = self.posts_by_id(&ids)?;
        sort_replies(&mut children);
        Ok(children)
    }

    fn list_root_posts(&self, authors: Option<&HashSet<String>>) -> Result<Vec<Post>> {
        let ids = self.list::<String>(ROOTS_KEY)?;
        let mut roots: Vec<Post> = self
            .posts_by_id(&ids)?
            .into_iter()
            .filter(|p| authors.map_or(true, |set| set.contains(&p.user_id)))
            .collect();
        sort_roots(&mut roots);
        Ok(roots)
    }

    fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let ids = self.list::<String>(&user_posts_key(user_id))?;
        let mut posts = self.posts_by_id(&ids)?;
        sort_roots(&mut posts);
        Ok(posts)
    }

    fn count_likes(&self, post_id: &str) -> Result<u64> {
        Ok(self.list::<Like>(&likes_key(post_id))?.len() as u64)
    }

    fn list_liking_users(&self, post_id: &str, with_handle: bool) -> Result<Vec<UserSummary>> {
        let mut users = Vec::new();
        for like in self.list::<Like>(&likes_key(post_id))? {
            if let Some(summary) = self.get_user_summary(&like.user_id, with_handle)? {
                users.push(summary);
            }
        }
        Ok(users)
    }

    /// Counts the same children `list_children` returns: dangling ids are
    /// not counted.
    fn count_direct_children(&self, post_id: &str) -> Result<u64> {
        let mut count = 0;
        for id in self.list::<String>(&replies_key(post_id))? {
            if self.exists(&post_key(&id))? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn list_followees(&self, user_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .list::<Follow>(&followings_key(user_id))?
            .into_iter()
            .map(|f| f.followee_id)
            .collect())
    }

    fn list_followers(&self, user_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .list::<String>(&followers_key(user_id))?
            .into_iter()
            .collect())
    }

    fn list_follows(&self) -> Result<Vec<Follow>> {
        let mut follows = Vec::new();
        for id in self.list::<String>(USERS_LIST_KEY)? {
            follows.extend(self.list::<Follow>(&followings_key(&id))?);
        }
        Ok(follows)
    }
}

impl StorageMut for KvStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        self.store.set_json(&user_key(&user.id), user)?;
        self.edit(USERS_LIST_KEY, |ids| lists::push_id(ids, &user.id))?;
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        if !self.exists(&user_key(&user.id))? {
            return Err(Error::NotFound(format!("user {}", user.id)));
        }
        self.store.set_json(&user_key(&user.id), user)?;
        Ok(())
    }

    fn remove_user(&self, user_id: &str) -> Result<()> {
        for post_id in self.list::<String>(&user_likes_key(user_id))? {
            self.edit(&likes_key(&post_id), |likes| lists::remove_like(likes, user_id))?;
        }
        for follow in self.list::<Follow>(&followings_key(user_id))? {
            self.edit(&followers_key(&follow.followee_id), |ids| {
                lists::remove_id(ids, user_id)
            })?;
        }
        for follower_id in self.list::<String>(&followers_key(user_id))? {
            self.edit(&followings_key(&follower_id), |follows| {
                lists::remove_follow(follows, user_id)
            })?;
        }

        self.edit(USERS_LIST_KEY, |ids| lists::remove_id(ids, user_id))?;
        for key in [
            user_likes_key(user_id),
            followings_key(user_id),
            followers_key(user_id),
            user_posts_key(user_id),
            user_key(user_id),
        ] {
            self.delete(&key)?;
        }
        Ok(())
    }

    fn insert_post(&self, post: &Post) -> Result<()> {
        self.store.set_json(&post_key(&post.id), post)?;

        if let Some(parent_id) = &post.parent_id {
            self.edit(&replies_key(parent_id), |ids| lists::push_id(ids, &post.id))?;
        } else {
            self.edit(ROOTS_KEY, |ids| lists::prepend_id(ids, &post.id))?;
        }
        self.edit(&user_posts_key(&post.user_id), |ids| {
            lists::prepend_id(ids, &post.id)
        })?;
        Ok(())
    }

    fn update_post(&self, post: &Post) -> Result<()> {
        if !self.exists(&post_key(&post.id))? {
            return Err(Error::NotFound(format!("post {}", post.id)));
        }
        self.store.set_json(&post_key(&post.id), post)?;
        Ok(())
    }

    fn remove_post(&self, post_id: &str) -> Result<()> {
        let post = match self.get_post(post_id)? {
            Some(p) => p,
            None => return Ok(()),
        };

        let list_key = match &post.parent_id {
            Some(parent_id) => replies_key(parent_id),
            None => ROOTS_KEY.to_string(),
        };
        self.edit(&list_key, |ids| lists::remove_id(ids, post_id))?;
        self.edit(&user_posts_key(&post.user_id), |ids| {
            lists::remove_id(ids, post_id)
        })?;
        for like in self.list::<Like>(&likes_key(post_id))? {
            self.edit(&user_likes_key(&like.user_id), |ids| {
                lists::remove_id(ids, post_id)
            })?;
        }

        self.delete(&likes_key(post_id))?;
        self.delete(&replies_key(post_id))?;
        self.delete(&post_key(post_id))
    }

    fn insert_like(&self, like: &Like) -> Result<bool> {
        let created = self.edit(&likes_key(&like.post_id), |likes| {
            lists::insert_like(likes, like)
        })?;
        if created {
            self.edit(&user_likes_key(&like.user_id), |ids| {
                lists::push_id(ids, &like.post_id)
            })?;
        }
        Ok(created)
    }

    fn remove_like(&self, user_id: &str, post_id: &str) -> Result<bool> {
        let removed = self.edit(&likes_key(post_id), |likes| {
            lists::remove_like(likes, user_id)
        })?;
        if removed {
            self.edit(&user_likes_key(user_id), |ids| lists::remove_id(ids, post_id))?;
        }
        Ok(removed)
    }

    fn insert_follow(&self, follow: &Follow) -> Result<bool> {
        let created = self.edit(&followings_key(&follow.follower_id), |follows| {
            lists::insert_follow(follows, follow)
        })?;
        if created {
            self.edit(&followers_key(&follow.followee_id), |ids| {
                lists::push_id(ids, &follow.follower_id)
            })?;
        }
        Ok(created)
    }

    fn remove_follow(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let removed = self.edit(&followings_key(follower_id), |follows| {
            lists::remove_follow(follows, followee_id)
        })?;
        if removed {
            self.edit(&followers_key(followee_id), |ids| {
                lists::remove_id(ids, follower_id)
            })?;
        }
        Ok(removed)
    }
}
