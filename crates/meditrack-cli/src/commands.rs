//! Command dispatch. Every command yields a response envelope.

use std::fmt::Display;
use std::fs;

use chrono::Utc;
use meditrack_core::auth::{self, AuthError};
use meditrack_core::db::{Database, DbError};
use meditrack_core::export::{drugs_to_csv, export_file_name};
use meditrack_core::import::{import_drugs, parse_bulk};
use meditrack_core::models::{
    Actor, CartLine, DrugPatch, NewDrug, Partition, Role, SelectionCriterion,
};
use meditrack_core::{ApiResponse, Inventory, SalesEngine};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::{
    AddDrugArgs, BatchDeleteArgs, Command, DrugCommand, ExportArgs, IdentityConfig, ImportArgs,
    SaleCommand, UpdateDrugArgs, UserCommand,
};

/// Failures outside the operations themselves.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("--password is required with --username")]
    MissingPassword,

    #[error("the admin role requires logging in with --username")]
    AdminRequiresLogin,
}

pub type Envelope = ApiResponse<Value>;

/// Resolve who is acting, logging in when a username is configured.
///
/// An asserted identity without credentials may only act as a pharmacist.
pub fn resolve_actor(db: &Database, identity: &IdentityConfig) -> Result<Actor, CliError> {
    if let Some(username) = &identity.username {
        let password = identity.password.as_deref().ok_or(CliError::MissingPassword)?;
        return Ok(auth::authenticate(db, username, password)?);
    }

    let role: Role = identity.role.parse().map_err(CliError::InvalidRole)?;
    if role == Role::Admin {
        return Err(CliError::AdminRequiresLogin);
    }
    Ok(Actor::new(
        identity.actor_id.clone(),
        identity.actor_name.clone(),
        role,
    ))
}

/// Run one command against the database.
pub fn execute(command: Command, db: &Database, actor: &Actor) -> Result<Envelope, CliError> {
    debug!(actor = %actor.name, role = %actor.role, "executing command");
    match command {
        Command::Drugs(cmd) => drugs(cmd, db, actor),
        Command::Sales(cmd) => sales(cmd, db, actor),
        Command::Import(args) => import(args, db, actor),
        Command::Export(args) => export(args, db),
        Command::Users(cmd) => users(cmd, db, actor),
    }
}

fn drugs(cmd: DrugCommand, db: &Database, actor: &Actor) -> Result<Envelope, CliError> {
    let inventory = Inventory::new(db);
    match cmd {
        DrugCommand::List { deleted, low_stock } => {
            if low_stock {
                respond(inventory.low_stock())
            } else {
                respond(inventory.list(partition(deleted)))
            }
        }
        DrugCommand::Show { id, deleted } => {
            if deleted {
                respond(inventory.get_deleted(&id))
            } else {
                respond(inventory.get(&id))
            }
        }
        DrugCommand::Add(args) => respond(inventory.create(new_drug(args), actor)),
        DrugCommand::Update(args) => {
            let id = args.id.clone();
            respond(inventory.update(&id, &drug_patch(args), actor))
        }
        DrugCommand::Lock { id } => respond(
            inventory
                .toggle_lock(&id, actor)
                .map(|locked| json!({ "id": id, "isLocked": locked })),
        ),
        DrugCommand::Delete { id } => respond(inventory.soft_delete(&id, actor)),
        DrugCommand::Restore { id } => respond(inventory.restore(&id)),
        DrugCommand::Purge { id, yes } => {
            if !yes {
                return Ok(Envelope::failure(
                    "Purge is irreversible; re-run with --yes to confirm",
                ));
            }
            respond_with(inventory.purge_deleted(&id, actor).map(|_| json!({ "id": id })), |_| {
                "Drug permanently removed".to_string()
            })
        }
        DrugCommand::BatchDelete(args) => {
            let result = match selection(&args) {
                Some(criterion) => inventory.batch_delete_matching(&criterion, actor),
                None => inventory.batch_delete(&args.ids, actor),
            };
            respond_with(result, |outcome| {
                format!(
                    "Deleted {} drug(s), skipped {} locked",
                    outcome.deleted, outcome.skipped_locked
                )
            })
        }
    }
}

fn sales(cmd: SaleCommand, db: &Database, actor: &Actor) -> Result<Envelope, CliError> {
    let engine = SalesEngine::new(db);
    match cmd {
        SaleCommand::List { limit, offset } => respond(engine.list_sales(limit, offset)),
        SaleCommand::Record { items, customer } => {
            let lines: Result<Vec<CartLine>, String> =
                items.iter().map(String::as_str).map(parse_cart_item).collect();
            match lines {
                Ok(lines) => respond(engine.record_sale(&lines, customer.as_deref(), actor)),
                Err(message) => Ok(Envelope::failure(message)),
            }
        }
    }
}

fn import(args: ImportArgs, db: &Database, actor: &Actor) -> Result<Envelope, CliError> {
    let text = fs::read_to_string(&args.file)?;
    if args.dry_run {
        let lines = parse_bulk(&text);
        let valid = lines.iter().filter(|line| line.is_valid()).count();
        let message = format!("{} valid / {} total", valid, lines.len());
        return Ok(Envelope::ok_with_message(serde_json::to_value(lines)?, message));
    }

    let outcome = import_drugs(db, &text, actor);
    let message = format!(
        "Imported {} drug(s), {} rejected",
        outcome.report.created.len(),
        outcome.report.failures.len()
            + outcome.lines.iter().filter(|line| !line.is_valid()).count()
    );
    Ok(Envelope::ok_with_message(serde_json::to_value(outcome)?, message))
}

fn export(args: ExportArgs, db: &Database) -> Result<Envelope, CliError> {
    let drugs = match Inventory::new(db).list(partition(args.deleted)) {
        Ok(drugs) => drugs,
        Err(e) => return Ok(Envelope::failure(e.to_string())),
    };
    if drugs.is_empty() {
        return Ok(Envelope::failure("No drugs to export"));
    }

    let csv = drugs_to_csv(&drugs);
    match args.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export_file_name(Utc::now().date_naive()))
            } else {
                path
            };
            fs::write(&path, csv)?;
            Ok(Envelope::ok_with_message(
                json!({ "path": path.display().to_string(), "rows": drugs.len() }),
                format!("Exported {} drug(s)", drugs.len()),
            ))
        }
        None => Ok(Envelope::ok(json!({ "csv": csv, "rows": drugs.len() }))),
    }
}

fn users(cmd: UserCommand, db: &Database, actor: &Actor) -> Result<Envelope, CliError> {
    match cmd {
        UserCommand::Add {
            login,
            name,
            user_role,
            new_password,
        } => {
            let role: Role = match user_role.parse() {
                Ok(role) => role,
                Err(message) => return Ok(Envelope::failure(message)),
            };
            respond(auth::register_user(
                db,
                &login,
                &name,
                role,
                &new_password,
                auth::DEFAULT_COST,
            ))
        }
        UserCommand::List => respond(db.list_users()),
        UserCommand::Me => respond(auth::current_user(db, &actor.id)),
        UserCommand::Update { name, new_password } => respond_with(
            auth::update_profile(
                db,
                &actor.id,
                name.as_deref(),
                new_password.as_deref(),
                auth::DEFAULT_COST,
            ),
            |user| format!("Updated profile for {}", user.username),
        ),
    }
}

fn respond<T: Serialize, E: Display>(result: Result<T, E>) -> Result<Envelope, CliError> {
    Ok(match result {
        Ok(data) => Envelope::ok(serde_json::to_value(data)?),
        Err(e) => Envelope::failure(e.to_string()),
    })
}

fn respond_with<T, E, F>(result: Result<T, E>, message: F) -> Result<Envelope, CliError>
where
    T: Serialize,
    E: Display,
    F: FnOnce(&T) -> String,
{
    Ok(match result {
        Ok(data) => {
            let message = message(&data);
            Envelope::ok_with_message(serde_json::to_value(data)?, message)
        }
        Err(e) => Envelope::failure(e.to_string()),
    })
}

fn partition(deleted: bool) -> Partition {
    if deleted {
        Partition::Deleted
    } else {
        Partition::Active
    }
}

fn new_drug(args: AddDrugArgs) -> NewDrug {
    let mut input = NewDrug::new(args.code, args.name, args.price, args.stock, args.expiry_date);
    input.category = args.category;
    input.manufacturer = args.manufacturer;
    if let Some(threshold) = args.min_stock_threshold {
        input.min_stock_threshold = threshold;
    }
    input.description = args.description;
    input.side_effects = args.side_effects;
    input.is_locked = args.locked;
    input
}

fn drug_patch(args: UpdateDrugArgs) -> DrugPatch {
    DrugPatch {
        name: args.name,
        code: args.code,
        category: args.category,
        manufacturer: args.manufacturer,
        price: args.price,
        stock: args.stock,
        min_stock_threshold: args.min_stock_threshold,
        expiry_date: args.expiry_date,
        description: clearable(args.description, args.clear_description),
        side_effects: clearable(args.side_effects, args.clear_side_effects),
    }
}

fn clearable(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn selection(args: &BatchDeleteArgs) -> Option<SelectionCriterion> {
    if let Some(category) = &args.category {
        Some(SelectionCriterion::Category(category.clone()))
    } else if let Some(manufacturer) = &args.manufacturer {
        Some(SelectionCriterion::Manufacturer(manufacturer.clone()))
    } else if let Some(date) = args.created_before {
        Some(SelectionCriterion::CreatedBefore(date))
    } else {
        args.created_after.map(SelectionCriterion::CreatedAfter)
    }
}

/// Parse a `<drug-id>:<quantity>` cart line.
pub fn parse_cart_item(item: &str) -> Result<CartLine, String> {
    let invalid = || format!("Invalid cart item {:?}, expected <drug-id>:<quantity>", item);
    let (id, quantity) = item.rsplit_once(':').ok_or_else(invalid)?;
    let id = id.trim();
    if id.is_empty() {
        return Err(invalid());
    }
    let quantity: u32 = quantity.trim().parse().map_err(|_| invalid())?;
    Ok(CartLine::new(id, quantity))
}
