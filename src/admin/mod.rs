//! Server-rendered admin pages: a generic table, form and delete-confirm
//! flow over every declared entity view.

pub mod forms;
pub mod table;
pub mod views;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    registry::{ListParams, Model},
    state::AppState,
};
use views::{EntityView, Field, FieldKind};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{entity}", get(list_page))
        .route("/{entity}/new", get(new_page).post(create_submit))
        .route("/{entity}/{id}/edit", get(edit_page).post(update_submit))
        .route("/{entity}/{id}/delete", get(confirm_page).post(delete_submit))
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

struct EntityLink {
    token: &'static str,
    title: &'static str,
}

#[derive(Template)]
#[template(path = "admin/index.html")]
struct IndexTemplate {
    entities: Vec<EntityLink>,
}

struct ColumnHeader {
    label: &'static str,
    key: &'static str,
    next_order: &'static str,
}

struct Row {
    id: String,
    cells: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin/list.html")]
struct ListTemplate {
    title: &'static str,
    token: &'static str,
    q: String,
    columns: Vec<ColumnHeader>,
    rows: Vec<Row>,
}

pub struct OptionItem {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct FormWidget {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: &'static str,
    pub value: String,
    pub options: Vec<OptionItem>,
}

#[derive(Template)]
#[template(path = "admin/form.html")]
struct FormTemplate {
    token: &'static str,
    heading: String,
    action: String,
    fields: Vec<FormWidget>,
    error: Option<String>,
}

struct SummaryItem {
    label: &'static str,
    value: String,
}

#[derive(Template)]
#[template(path = "admin/confirm.html")]
struct ConfirmTemplate {
    title: &'static str,
    token: &'static str,
    id: String,
    summary: Vec<SummaryItem>,
}

async fn index() -> AppResult<Html<String>> {
    let template = IndexTemplate {
        entities: views::VIEWS
            .iter()
            .map(|view| EntityLink {
                token: view.token,
                title: view.title,
            })
            .collect(),
    };
    Ok(Html(template.render()?))
}

async fn list_page(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Html<String>> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let data = view.model.list(&state, &ListParams::default()).await?;
    let mut records = match data {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        other => vec![other],
    };

    let q = query.q.unwrap_or_default();
    if !q.is_empty() {
        records.retain(|record| table::matches_query(record, &q));
    }

    let ascending = query.order.as_deref() != Some("desc");
    if let Some(sort) = query.sort.as_deref() {
        table::sort_records(&mut records, sort, ascending);
    }

    let columns = view
        .fields
        .iter()
        .map(|field| ColumnHeader {
            label: field.label,
            key: field.name,
            next_order: next_order(field.name, &query.sort, ascending),
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| Row {
            id: record
                .get("_id")
                .map(table::cell_text)
                .unwrap_or_default(),
            cells: view
                .fields
                .iter()
                .map(|field| {
                    table::cell_text(
                        table::field_lookup(record, field.name).unwrap_or(&Value::Null),
                    )
                })
                .collect(),
        })
        .collect();

    let template = ListTemplate {
        title: view.title,
        token: view.token,
        q,
        columns,
        rows,
    };
    Ok(Html(template.render()?))
}

async fn new_page(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> AppResult<Html<String>> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let fields = build_widgets(&state, view, None, None).await?;
    render_form(view, format!("New {}", view.token), new_action(view), fields, None)
}

async fn create_submit(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let body = match forms::form_to_json(view, &pairs) {
        Ok(body) => body,
        Err(err) => return form_retry(&state, view, None, &pairs, err).await,
    };
    match view.model.create(&state, body).await {
        Ok(_) => Ok(Redirect::to(&format!("/admin/{}", view.token)).into_response()),
        Err(err @ (AppError::Validation(_) | AppError::Conflict(_))) => {
            form_retry(&state, view, None, &pairs, err).await
        }
        Err(err) => Err(err),
    }
}

async fn edit_page(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let record = load_record(&state, view, &id).await?;
    let fields = build_widgets(&state, view, Some(&record), None).await?;
    render_form(
        view,
        format!("Edit {}", view.token),
        edit_action(view, &id),
        fields,
        None,
    )
}

async fn update_submit(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let record_id = parse_id(&id)?;
    let body = match forms::form_to_json(view, &pairs) {
        Ok(body) => body,
        Err(err) => return form_retry(&state, view, Some(&id), &pairs, err).await,
    };
    match view.model.update(&state, record_id, body).await {
        Ok(_) => Ok(Redirect::to(&format!("/admin/{}", view.token)).into_response()),
        Err(err @ (AppError::Validation(_) | AppError::Conflict(_))) => {
            form_retry(&state, view, Some(&id), &pairs, err).await
        }
        Err(err) => Err(err),
    }
}

async fn confirm_page(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let record = load_record(&state, view, &id).await?;
    let summary = view
        .fields
        .iter()
        .map(|field| SummaryItem {
            label: field.label,
            value: table::cell_text(
                table::field_lookup(&record, field.name).unwrap_or(&Value::Null),
            ),
        })
        .collect();
    let template = ConfirmTemplate {
        title: view.title,
        token: view.token,
        id,
        summary,
    };
    Ok(Html(template.render()?))
}

async fn delete_submit(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> AppResult<Response> {
    let view = EntityView::resolve(&entity).ok_or(AppError::ModelNotFound)?;
    let record_id = parse_id(&id)?;
    view.model.delete(&state, record_id).await?;
    Ok(Redirect::to(&format!("/admin/{}", view.token)).into_response())
}

fn render_form(
    view: &EntityView,
    heading: String,
    action: String,
    fields: Vec<FormWidget>,
    error: Option<String>,
) -> AppResult<Html<String>> {
    let template = FormTemplate {
        token: view.token,
        heading,
        action,
        fields,
        error,
    };
    Ok(Html(template.render()?))
}

/// Re-renders the form with the submitted values and an inline error
/// instead of dropping the failure in a log.
async fn form_retry(
    state: &AppState,
    view: &EntityView,
    id: Option<&str>,
    pairs: &[(String, String)],
    err: AppError,
) -> AppResult<Response> {
    let fields = build_widgets(state, view, None, Some(pairs)).await?;
    let (heading, action) = match id {
        Some(id) => (format!("Edit {}", view.token), edit_action(view, id)),
        None => (format!("New {}", view.token), new_action(view)),
    };
    let page = render_form(view, heading, action, fields, Some(err.to_string()))?;
    Ok(page.into_response())
}

fn new_action(view: &EntityView) -> String {
    format!("/admin/{}/new", view.token)
}

fn edit_action(view: &EntityView, id: &str) -> String {
    format!("/admin/{}/{}/edit", view.token, id)
}

async fn load_record(state: &AppState, view: &EntityView, id: &str) -> AppResult<Value> {
    let record = view.model.get(state, parse_id(id)?).await?;
    if record.is_null() {
        return Err(AppError::NotFound);
    }
    Ok(record)
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid record id: {raw}")))
}

async fn build_widgets(
    state: &AppState,
    view: &EntityView,
    record: Option<&Value>,
    submitted: Option<&[(String, String)]>,
) -> AppResult<Vec<FormWidget>> {
    let mut widgets = Vec::new();
    for field in view.fields.iter().filter(|field| field.in_form) {
        let value = if let Some(pairs) = submitted {
            pairs
                .iter()
                .find(|(key, _)| key == field.name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        } else if let Some(record) = record {
            forms::display_value(field, record)
        } else {
            String::new()
        };

        let options = match field.kind {
            FieldKind::Select(options) => options
                .iter()
                .map(|option| OptionItem {
                    value: option.to_string(),
                    label: option.to_string(),
                    selected: *option == value,
                })
                .collect(),
            FieldKind::Reference(target) => {
                reference_options(state, target, std::slice::from_ref(&value)).await?
            }
            FieldKind::ReferenceList(target) => {
                let selected: Vec<String> = if let Some(pairs) = submitted {
                    pairs
                        .iter()
                        .filter(|(key, _)| key == field.name)
                        .map(|(_, value)| value.clone())
                        .collect()
                } else if let Some(record) = record {
                    forms::selected_ids(field, record)
                } else {
                    Vec::new()
                };
                reference_options(state, target, &selected).await?
            }
            _ => Vec::new(),
        };

        widgets.push(FormWidget {
            name: field.name,
            label: field.label,
            widget: widget_name(field),
            value,
            options,
        });
    }
    Ok(widgets)
}

fn widget_name(field: &Field) -> &'static str {
    match field.kind {
        FieldKind::Text | FieldKind::Date => "text",
        FieldKind::Number => "number",
        FieldKind::Select(_) => "select",
        FieldKind::Reference(_) => "reference",
        FieldKind::ReferenceList(_) => "reference_list",
        FieldKind::Json => "json",
    }
}

/// The full referenced list backs the dropdown; there is no pagination or
/// incremental search over large reference sets.
async fn reference_options(
    state: &AppState,
    target: &str,
    selected: &[String],
) -> AppResult<Vec<OptionItem>> {
    let model = Model::resolve_admin(target).ok_or(AppError::ModelNotFound)?;
    let data = model.list(state, &ListParams::default()).await?;
    let records = match data {
        Value::Array(records) => records,
        _ => Vec::new(),
    };
    Ok(records
        .iter()
        .map(|record| {
            let value = record
                .get("_id")
                .map(table::cell_text)
                .unwrap_or_default();
            OptionItem {
                selected: selected.contains(&value),
                label: table::cell_text(record),
                value,
            }
        })
        .collect())
}

/// Clicking the active ascending column flips it to descending; anything
/// else starts ascending.
fn next_order(key: &str, current_sort: &Option<String>, current_ascending: bool) -> &'static str {
    if current_sort.as_deref() == Some(key) && current_ascending {
        "desc"
    } else {
        "asc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_sort_toggles_direction() {
        let sorted = Some("price".to_string());
        assert_eq!(next_order("price", &sorted, true), "desc");
        assert_eq!(next_order("price", &sorted, false), "asc");
        assert_eq!(next_order("name", &sorted, true), "asc");
        assert_eq!(next_order("name", &None, true), "asc");
    }
}
