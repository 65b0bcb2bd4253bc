//! Category administration route handlers (admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use helpdesk_core::CategoryId;

use crate::api::{Category, CategoryInput};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Category create/edit form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

impl CategoryForm {
    /// Convert to the backend body, dropping empty optional fields.
    fn to_input(&self) -> CategoryInput {
        CategoryInput {
            name: self.name.trim().to_owned(),
            description: none_if_empty(&self.description),
            color: none_if_empty(&self.color),
        }
    }
}

fn none_if_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Query parameters carrying a flash message across a redirect.
#[derive(Debug, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Category list page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoryListTemplate {
    pub user: CurrentUser,
    pub categories: Vec<Category>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Category create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub user: CurrentUser,
    pub title: &'static str,
    /// Where the form posts to.
    pub action: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub error: Option<String>,
}

/// Deletion confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub user: CurrentUser,
    pub category: Category,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display all categories, including inactive ones.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(flash): Query<FlashQuery>,
) -> Result<Response> {
    let categories = match state.api().list_all_categories(&user.api).await {
        Ok(categories) => categories,
        Err(e) if e.status() == Some(401) => return Err(e.into()),
        Err(e) => {
            return Ok(CategoryListTemplate {
                user,
                categories: Vec::new(),
                error: Some(e.user_message()),
                success: None,
            }
            .into_response());
        }
    };
    Ok(CategoryListTemplate {
        user,
        categories,
        error: flash.error,
        success: flash.success,
    }
    .into_response())
}

/// Display the new category form.
pub async fn new_category(RequireAdmin(user): RequireAdmin) -> CategoryFormTemplate {
    CategoryFormTemplate {
        user,
        title: "New Category",
        action: "/admin/categories".to_owned(),
        name: String::new(),
        description: String::new(),
        color: String::new(),
        error: None,
    }
}

/// Handle category creation.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    if form.name.trim().is_empty() {
        return Ok(CategoryFormTemplate {
            user,
            title: "New Category",
            action: "/admin/categories".to_owned(),
            name: form.name,
            description: form.description,
            color: form.color,
            error: Some("Name is required".to_owned()),
        }
        .into_response());
    }
    match state.api().create_category(&user.api, &form.to_input()).await {
        Ok(created) => {
            tracing::info!(category_id = %created.id, "Category created");
            Ok(Redirect::to("/admin/categories?success=Category+created").into_response())
        }
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => Ok(CategoryFormTemplate {
            user,
            title: "New Category",
            action: "/admin/categories".to_owned(),
            name: form.name,
            description: form.description,
            color: form.color,
            error: Some(e.user_message()),
        }
        .into_response()),
    }
}

/// Display the edit form for a category.
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let category = match state.api().get_category(&user.api, id).await {
        Ok(category) => category,
        Err(e) if e.is_not_found() => {
            return Err(AppError::NotFound(format!("category {id}")));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(CategoryFormTemplate {
        user,
        title: "Edit Category",
        action: format!("/admin/categories/{id}"),
        name: category.name,
        description: category.description.unwrap_or_default(),
        color: category.color.unwrap_or_default(),
        error: None,
    }
    .into_response())
}

/// Handle a category update.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let action = format!("/admin/categories/{id}");
    if form.name.trim().is_empty() {
        return Ok(CategoryFormTemplate {
            user,
            title: "Edit Category",
            action,
            name: form.name,
            description: form.description,
            color: form.color,
            error: Some("Name is required".to_owned()),
        }
        .into_response());
    }
    match state.api().update_category(&user.api, id, &form.to_input()).await {
        Ok(_) => {
            tracing::info!(category_id = %id, "Category updated");
            Ok(Redirect::to("/admin/categories?success=Category+updated").into_response())
        }
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => Ok(CategoryFormTemplate {
            user,
            title: "Edit Category",
            action,
            name: form.name,
            description: form.description,
            color: form.color,
            error: Some(e.user_message()),
        }
        .into_response()),
    }
}

/// Display the deletion confirmation page.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let category = match state.api().get_category(&user.api, id).await {
        Ok(category) => category,
        Err(e) if e.is_not_found() => {
            return Err(AppError::NotFound(format!("category {id}")));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(ConfirmDeleteTemplate { user, category }.into_response())
}

/// Handle a category deletion.
///
/// The backend refuses to delete a category with tickets; its message is
/// flashed back on the list.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    match state.api().delete_category(&user.api, id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            Ok(Redirect::to("/admin/categories?success=Category+deleted").into_response())
        }
        Err(e) if e.status() == Some(401) => Err(e.into()),
        Err(e) => Ok(Redirect::to(&format!(
            "/admin/categories?error={}",
            urlencoding::encode(&e.user_message())
        ))
        .into_response()),
    }
}
