use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::errors::{Error, Result};
use crate::models::models::{Follow, Like, Post, User, UserSummary};
use crate::store::{Storage, StorageMut};
use crate::thread::ordering::{sort_replies, sort_roots};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    posts: HashMap<String, Post>,
    likes: Vec<Like>,
    follows: Vec<Follow>,
}

/// Process-local store used by the native server and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| Error::storage("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| Error::storage("memory store lock poisoned"))
    }
}

impl Storage for MemoryStore {
    fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        Ok(self.read()?.posts.get(post_id).cloned())
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    fn list_children(&self, post_id: &str) -> Result<Vec<Post>> {
        let tables = self.read()?;
        let mut children: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.parent_id.as_deref() == Some(post_id))
            .cloned()
            .collect();
        sort_replies(&mut children);
        Ok(children)
    }

    fn list_root_posts(&self, authors: Option<&HashSet<String>>) -> Result<Vec<Post>> {
        let tables = self.read()?;
        let mut roots: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.is_root())
            .filter(|p| authors.map_or(true, |set| set.contains(&p.user_id)))
            .cloned()
            .collect();
        sort_roots(&mut roots);
        Ok(roots)
    }

    fn list_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        let tables = self.read()?;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_roots(&mut posts);
        Ok(posts)
    }

    fn count_likes(&self, post_id: &str) -> Result<u64> {
        let tables = self.read()?;
        Ok(tables.likes.iter().filter(|l| l.post_id == post_id).count() as u64)
    }

    fn list_liking_users(&self, post_id: &str, with_handle: bool) -> Result<Vec<UserSummary>> {
        let tables = self.read()?;
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .filter_map(|l| tables.users.get(&l.user_id))
            .map(|u| u.summary(with_handle))
            .collect())
    }

    fn count_direct_children(&self, post_id: &str) -> Result<u64> {
        let tables = self.read()?;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.parent_id.as_deref() == Some(post_id))
            .count() as u64)
    }

    fn list_followees(&self, user_id: &str) -> Result<HashSet<String>> {
        let tables = self.read()?;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.followee_id.clone())
            .collect())
    }

    fn list_followers(&self, user_id: &str) -> Result<HashSet<String>> {
        let tables = self.read()?;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.followee_id == user_id)
            .map(|f| f.follower_id.clone())
            .collect())
    }

    fn list_follows(&self) -> Result<Vec<Follow>> {
        Ok(self.read()?.follows.clone())
    }
}

impl StorageMut for MemoryStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        self.write()?.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.write()?;
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("user {}", user.id))),
        }
    }

    fn remove_user(&self, user_id: &str) -> Result<()> {
        let mut tables = self.write()?;
        tables.users.remove(user_id);
        tables.likes.retain(|l| l.user_id != user_id);
        tables
            .follows
            .retain(|f| f.follower_id != user_id && f.followee_id != user_id);
        Ok(())
    }

    fn insert_post(&self, post: &Post) -> Result<()> {
        self.write()?.posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    fn update_post(&self, post: &Post) -> Result<()> {
        let mut tables = self.write()?;
        match tables.posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("post {}", post.id))),
        }
    }

    fn remove_post(&self, post_id: &str) -> Result<()> {
        let mut tables = self.write()?;
        tables.posts.remove(post_id);
        tables.likes.retain(|l| l.post_id != post_id);
        Ok(())
    }

    fn insert_like(&self, like: &Like) -> Result<bool> {
        let mut tables = self.write()?;
        if tables
            .likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Ok(false);
        }
        tables.likes.push(like.clone());
        Ok(true)
    }

    fn remove_like(&self, user_id: &str, post_id: &str) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(tables.likes.len() != before)
    }

    fn insert_follow(&self, follow: &Follow) -> Result<bool> {
        let mut tables = self.write()?;
        if tables
            .follows
            .iter()
            .any(|f| f.follower_id == follow.follower_id && f.followee_id == follow.followee_id)
        {
            return Ok(false);
        }
        tables.follows.push(follow.clone());
        Ok(true)
    }

    fn remove_follow(&self, follower_id: &str, followee_id: &str) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.followee_id == followee_id));
        Ok(tables.follows.len() != before)
    }
}
