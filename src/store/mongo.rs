use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};

use crate::error::AppError;
use crate::models::{Activity, Comment, Document, Folder, User, WorkflowStatus};
use crate::store::Store;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes");

        let document_indexes = vec![
            // Full-text search over display name, cached summary and extracted text
            IndexModel::builder()
                .keys(doc! { "filename": "text", "summary": "text", "content": "text" })
                .options(named_index("search_text_index"))
                .build(),
            IndexModel::builder()
                .keys(doc! { "file_id": 1 })
                .options(named_index("file_id_lookup"))
                .build(),
            IndexModel::builder()
                .keys(doc! { "folder_id": 1 })
                .options(named_index("folder_lookup"))
                .build(),
        ];
        self.documents()
            .create_indexes(document_indexes, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create indexes on documents collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created indexes on documents");

        let comment_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "document_id": 1, "parent_id": 1, "created_at": -1 })
                .options(named_index("thread_lookup"))
                .build(),
            IndexModel::builder()
                .keys(doc! { "parent_id": 1, "created_at": 1 })
                .options(named_index("reply_lookup"))
                .build(),
        ];
        self.comments()
            .create_indexes(comment_indexes, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create indexes on comments collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created indexes on comments");

        let folder_indexes = vec![
            IndexModel::builder()
                .keys(doc! { "owner_id": 1 })
                .options(named_index("owner_lookup"))
                .build(),
            IndexModel::builder()
                .keys(doc! { "parent_id": 1 })
                .options(named_index("parent_lookup"))
                .build(),
        ];
        self.folders()
            .create_indexes(folder_indexes, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create indexes on folders collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created indexes on folders");

        let activity_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "timestamp": -1 })
            .options(named_index("actor_feed"))
            .build();
        self.activities()
            .create_index(activity_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create index on activities collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on activities");

        Ok(())
    }

    pub fn documents(&self) -> Collection<Document> {
        self.db.collection("documents")
    }

    pub fn comments(&self) -> Collection<Comment> {
        self.db.collection("comments")
    }

    pub fn folders(&self) -> Collection<Folder> {
        self.db.collection("folders")
    }

    pub fn activities(&self) -> Collection<Activity> {
        self.db.collection("activities")
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }
}

fn named_index(name: &str) -> IndexOptions {
    IndexOptions::builder().name(name.to_string()).build()
}

/// Quotes regex metacharacters so user queries match as plain substrings.
fn escape_regex(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if r"\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_document(&self, document: &Document) -> Result<(), AppError> {
        self.documents().insert_one(document, None).await?;
        Ok(())
    }

    async fn find_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        Ok(self.documents().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_document_by_file_id(
        &self,
        file_id: &str,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .documents()
            .find_one(doc! { "file_id": file_id }, None)
            .await?)
    }

    async fn list_documents(&self, search: Option<&str>) -> Result<Vec<Document>, AppError> {
        let filter = match search {
            Some(query) => doc! { "$text": { "$search": query } },
            None => doc! {},
        };
        let options = FindOptions::builder()
            .sort(doc! { "uploaded_at": -1 })
            .build();

        let mut cursor = self.documents().find(filter, options).await?;
        let mut documents = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            documents.push(document);
        }
        Ok(documents)
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<Document>, AppError> {
        let pattern = escape_regex(query);
        let filter = doc! {
            "$or": [
                { "filename": { "$regex": pattern.clone(), "$options": "i" } },
                { "summary": { "$regex": pattern, "$options": "i" } },
            ]
        };
        let options = FindOptions::builder()
            .sort(doc! { "uploaded_at": -1 })
            .build();

        let mut cursor = self.documents().find(filter, options).await?;
        let mut documents = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            documents.push(document);
        }
        Ok(documents)
    }

    async fn update_workflow(
        &self,
        id: &str,
        status: Option<WorkflowStatus>,
        reviewers: Option<Vec<String>>,
    ) -> Result<Option<Document>, AppError> {
        let mut fields = doc! {};
        if let Some(status) = status {
            fields.insert("workflow.status", status.to_string());
        }
        if let Some(reviewers) = reviewers {
            fields.insert("workflow.reviewers", reviewers);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .documents()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields }, options)
            .await?)
    }

    async fn set_filename(&self, id: &str, filename: &str) -> Result<bool, AppError> {
        let result = self
            .documents()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "filename": filename } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_content(
        &self,
        id: &str,
        file_id: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .documents()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "file_id": file_id, "content": content } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_summary(&self, id: &str, summary: &str) -> Result<bool, AppError> {
        let result = self
            .documents()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "summary": summary } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_folder(
        &self,
        id: &str,
        owner_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<Document>, AppError> {
        let folder_value = match folder_id {
            Some(folder_id) => Bson::String(folder_id.to_string()),
            None => Bson::Null,
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        Ok(self
            .documents()
            .find_one_and_update(
                doc! { "_id": id, "owner_id": owner_id },
                doc! { "$set": { "folder_id": folder_value } },
                options,
            )
            .await?)
    }

    async fn delete_document(&self, id: &str) -> Result<bool, AppError> {
        let result = self.documents().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_documents_in_folder(&self, folder_id: &str) -> Result<u64, AppError> {
        Ok(self
            .documents()
            .count_documents(doc! { "folder_id": folder_id }, None)
            .await?)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        self.comments().insert_one(comment, None).await?;
        Ok(())
    }

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        Ok(self.comments().find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_top_level_comments(
        &self,
        document_id: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let filter = doc! { "document_id": document_id, "parent_id": null };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let mut cursor = self.comments().find(filter, options).await?;
        let mut comments = Vec::new();
        while let Some(comment) = cursor.try_next().await? {
            comments.push(comment);
        }
        Ok(comments)
    }

    async fn count_top_level_comments(&self, document_id: &str) -> Result<u64, AppError> {
        Ok(self
            .comments()
            .count_documents(
                doc! { "document_id": document_id, "parent_id": null },
                None,
            )
            .await?)
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        let mut cursor = self
            .comments()
            .find(doc! { "parent_id": parent_id }, options)
            .await?;
        let mut replies = Vec::new();
        while let Some(reply) = cursor.try_next().await? {
            replies.push(reply);
        }
        Ok(replies)
    }

    async fn list_replies_for_parents(
        &self,
        parent_ids: &[String],
    ) -> Result<Vec<Comment>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        let mut cursor = self
            .comments()
            .find(doc! { "parent_id": { "$in": parent_ids.to_vec() } }, options)
            .await?;
        let mut replies = Vec::new();
        while let Some(reply) = cursor.try_next().await? {
            replies.push(reply);
        }
        Ok(replies)
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, AppError> {
        let result = self.comments().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_replies(&self, parent_id: &str) -> Result<u64, AppError> {
        let result = self
            .comments()
            .delete_many(doc! { "parent_id": parent_id }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn insert_folder(&self, folder: &Folder) -> Result<(), AppError> {
        self.folders().insert_one(folder, None).await?;
        Ok(())
    }

    async fn find_folder(&self, id: &str) -> Result<Option<Folder>, AppError> {
        Ok(self.folders().find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_folders_for_owner(&self, owner_id: &str) -> Result<Vec<Folder>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();

        let mut cursor = self
            .folders()
            .find(doc! { "owner_id": owner_id }, options)
            .await?;
        let mut folders = Vec::new();
        while let Some(folder) = cursor.try_next().await? {
            folders.push(folder);
        }
        Ok(folders)
    }

    async fn delete_folder(&self, id: &str) -> Result<bool, AppError> {
        let result = self.folders().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_subfolders(&self, parent_id: &str) -> Result<u64, AppError> {
        Ok(self
            .folders()
            .count_documents(doc! { "parent_id": parent_id }, None)
            .await?)
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.activities().insert_one(activity, None).await?;
        Ok(())
    }

    async fn list_activities_for_user(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .build();

        let mut cursor = self
            .activities()
            .find(doc! { "user_id": user_id }, options)
            .await?;
        let mut activities = Vec::new();
        while let Some(activity) = cursor.try_next().await? {
            activities.push(activity);
        }
        Ok(activities)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut cursor = self.users().find(doc! {}, None).await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            users.push(user);
        }
        Ok(users)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
