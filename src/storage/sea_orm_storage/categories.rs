//! 分类存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::categories::{ActiveModel, Column, Entity as Categories};
use crate::entity::course_categories::{Column as LinkColumn, Entity as CourseCategories};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    categories::{
        Category, CategoryDeleteOutcome, CategoryListQuery, CategoryListResponse,
        CategoryWithCount,
    },
    courses::entities::CourseStatus,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_category_impl(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Category> {
        let model = ActiveModel {
            name: Set(name),
            description: Set(description),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LearnHubError::from_db("创建分类失败", e))?;

        Ok(result.into_category())
    }

    pub async fn get_category_by_id_impl(&self, id: i64) -> Result<Option<Category>> {
        let result = Categories::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类失败: {e}")))?;

        Ok(result.map(|m| m.into_category()))
    }

    /// 各分类下的课程数，`only_active` 时只计上架课程
    async fn category_course_counts(
        &self,
        category_ids: Vec<i64>,
        only_active: bool,
    ) -> Result<HashMap<i64, i64>> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut select = CourseCategories::find()
            .select_only()
            .column(LinkColumn::CategoryId)
            .column_as(LinkColumn::Id.count(), "course_count")
            .filter(LinkColumn::CategoryId.is_in(category_ids));

        if only_active {
            let active_ids: Vec<i64> = Courses::find()
                .select_only()
                .column(CourseColumn::Id)
                .filter(CourseColumn::Status.eq(CourseStatus::Active.to_string()))
                .into_tuple::<i64>()
                .all(&self.db)
                .await
                .map_err(|e| LearnHubError::database_operation(format!("查询上架课程失败: {e}")))?;
            select = select.filter(LinkColumn::CourseId.is_in(active_ids));
        }

        let rows = select
            .group_by(LinkColumn::CategoryId)
            .into_tuple::<(i64, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计分类课程数失败: {e}")))?;

        Ok(rows.into_iter().collect())
    }

    pub async fn list_categories_with_pagination_impl(
        &self,
        query: CategoryListQuery,
    ) -> Result<CategoryListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Categories::find();
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Name.contains(&escaped));
        }

        let paginator = select.order_by_asc(Column::Name).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类页数失败: {e}")))?;
        let categories = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类列表失败: {e}")))?;

        let counts = self
            .category_course_counts(categories.iter().map(|c| c.id).collect(), false)
            .await?;

        Ok(CategoryListResponse {
            items: categories
                .into_iter()
                .map(|m| CategoryWithCount {
                    course_count: counts.get(&m.id).copied().unwrap_or(0),
                    category: m.into_category(),
                })
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_categories_with_active_counts_impl(&self) -> Result<Vec<CategoryWithCount>> {
        let categories = Categories::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类列表失败: {e}")))?;

        let counts = self
            .category_course_counts(categories.iter().map(|c| c.id).collect(), true)
            .await?;

        Ok(categories
            .into_iter()
            .map(|m| CategoryWithCount {
                course_count: counts.get(&m.id).copied().unwrap_or(0),
                category: m.into_category(),
            })
            .collect())
    }

    pub async fn update_category_impl(
        &self,
        id: i64,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<Category>> {
        let Some(existing) = Categories::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询分类失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(name) = name {
            model.name = Set(name);
        }
        if let Some(description) = description {
            model.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LearnHubError::from_db("更新分类失败", e))?;

        Ok(Some(updated.into_category()))
    }

    /// 有课程引用时拒绝删除
    pub async fn delete_category_impl(&self, id: i64) -> Result<CategoryDeleteOutcome> {
        if self.get_category_by_id_impl(id).await?.is_none() {
            return Ok(CategoryDeleteOutcome::NotFound);
        }

        let in_use = CourseCategories::find()
            .filter(LinkColumn::CategoryId.eq(id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计分类引用失败: {e}")))?;
        if in_use > 0 {
            return Ok(CategoryDeleteOutcome::InUse(in_use as i64));
        }

        Categories::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("删除分类失败: {e}")))?;

        Ok(CategoryDeleteOutcome::Deleted)
    }
}
