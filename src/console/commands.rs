//! Console command implementations
//!
//! Each command takes the storage and the argument text after the command word
//! and returns an [`Outcome`]: the line to print on success (if any), or the
//! [`CommandError`] whose message is printed instead. Commands never panic on
//! bad input and never stop the read loop.

use crate::console::parse::{parse_param, DottedCall};
use crate::engine::storage::FileStorage;
use crate::error::{CommandError, HbnbError};
use crate::models::{is_reserved, AttrValue, Entity};
use crate::types::EntityKind;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, error, info, warn};

/// Result of running one command
pub type Outcome = std::result::Result<Option<String>, CommandError>;

/// Command words recognized at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Quit,
    #[strum(serialize = "EOF")]
    Eof,
    Help,
    Create,
    Show,
    Destroy,
    All,
    Update,
}

impl Command {
    /// One-line description shown by `help <command>`
    pub fn description(self) -> &'static str {
        match self {
            Self::Quit => "Quit command to exit the program",
            Self::Eof => "EOF command to exit the program",
            Self::Help => "List available commands with \"help\" or detailed help with \"help cmd\"",
            Self::Create => "Create a new instance of a class",
            Self::Show => "Prints the string representation of an instance",
            Self::Destroy => "Deletes an instance based on the class name and id",
            Self::All => "Prints string representation of all instances",
            Self::Update => "Updates an instance based on the class name and id",
        }
    }

    /// Usage line shown by `help <command>`, if the command takes arguments
    pub fn usage(self) -> Option<&'static str> {
        match self {
            Self::Create => {
                Some("Usage: create <class_name> [<attribute_name>=<attribute_value> ...]")
            }
            Self::Show => Some("Usage: show <class_name> <instance_id>"),
            Self::Destroy => Some("Usage: destroy <class_name> <instance_id>"),
            Self::All => Some("Usage: all [class_name]"),
            Self::Update => Some(
                "Usage: update <class_name> <instance_id> <attribute_name> <attribute_value>",
            ),
            Self::Quit | Self::Eof | Self::Help => None,
        }
    }
}

/// First argument must name a known class
fn require_class(args: &[&str]) -> Result<EntityKind, CommandError> {
    let name = args.first().ok_or(CommandError::ClassNameMissing)?;
    EntityKind::lookup(name).ok_or(CommandError::ClassDoesNotExist)
}

/// First two arguments must name a class and an id present in storage
fn require_instance<'a>(
    storage: &FileStorage,
    args: &[&'a str],
) -> Result<(EntityKind, &'a str), CommandError> {
    let kind = require_class(args)?;
    let id = *args.get(1).ok_or(CommandError::InstanceIdMissing)?;
    if storage.get(kind, id).is_none() {
        return Err(CommandError::NoInstanceFound);
    }
    Ok((kind, id))
}

/// Log a failed save and turn it into the message printed on the console
fn save_failed(err: HbnbError) -> CommandError {
    error!("Failed to save storage: {}", err);
    err.into()
}

/// `create <Class> [key=value ...]`: prints the new id
pub fn create(storage: &mut FileStorage, args: &str) -> Outcome {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let kind = require_class(&tokens)?;

    let mut entity = Entity::new(kind);
    for token in &tokens[1..] {
        match parse_param(token) {
            Some((name, _)) if is_reserved(name) => {
                debug!("create: ignoring reserved attribute {:?}", name);
            }
            Some((name, value)) => {
                entity.set(name, value);
            }
            None => debug!("create: ignoring malformed parameter {:?}", token),
        }
    }

    if let Err(err) = entity.save(storage) {
        // Not persisted, so it must not stay visible either
        storage.remove(kind, entity.id());
        return Err(save_failed(err));
    }
    info!("Created {}", entity.key());
    Ok(Some(entity.id().to_string()))
}

/// `show <Class> <id>`: prints the display string
pub fn show(storage: &FileStorage, args: &str) -> Outcome {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    show_args(storage, &tokens)
}

fn show_args(storage: &FileStorage, args: &[&str]) -> Outcome {
    let (kind, id) = require_instance(storage, args)?;
    Ok(storage.get(kind, id).map(|entity| entity.to_string()))
}

/// `destroy <Class> <id>`: removes the entity and persists
pub fn destroy(storage: &mut FileStorage, args: &str) -> Outcome {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    destroy_args(storage, &tokens)
}

fn destroy_args(storage: &mut FileStorage, args: &[&str]) -> Outcome {
    let (kind, id) = require_instance(storage, args)?;
    let removed = storage.remove(kind, id);
    if let Err(err) = storage.save() {
        if let Some(entity) = removed {
            storage.new(entity);
        }
        return Err(save_failed(err));
    }
    info!("Destroyed {}", kind.key(id));
    Ok(None)
}

/// `all [Class]`: prints `[display, display, ...]`
pub fn all(storage: &FileStorage, args: &str) -> Outcome {
    let listed: Vec<String> = match args.split_whitespace().next() {
        Some(name) => {
            let kind = EntityKind::lookup(name).ok_or(CommandError::ClassDoesNotExist)?;
            storage.all_of(kind).map(|e| e.to_string()).collect()
        }
        None => storage.all().values().map(|e| e.to_string()).collect(),
    };
    Ok(Some(format!("[{}]", listed.join(", "))))
}

/// `count <Class>`: number of entities of that class (dotted form only)
pub fn count(storage: &FileStorage, args: &str) -> Outcome {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let kind = require_class(&tokens)?;
    Ok(Some(storage.count(kind).to_string()))
}

/// `update <Class> <id> <attr> <value>`: stores `value` verbatim as a string
pub fn update(storage: &mut FileStorage, args: &str) -> Outcome {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    update_args(storage, &tokens)
}

/// `args` is `[class, id, attr, value, ...]`; the value is one argument and
/// may contain spaces when it comes from the dotted form.
fn update_args(storage: &mut FileStorage, args: &[&str]) -> Outcome {
    let (kind, id) = require_instance(storage, args)?;
    let name = *args.get(2).ok_or(CommandError::AttributeNameMissing)?;
    let value = *args.get(3).ok_or(CommandError::ValueMissing)?;

    if is_reserved(name) {
        warn!("update: refusing to overwrite reserved attribute {:?}", name);
        return Ok(None);
    }

    let Some(entity) = storage.get_mut(kind, id) else {
        return Err(CommandError::NoInstanceFound);
    };
    let previous = entity.clone();
    entity.set(name, AttrValue::from(value));
    entity.touch();

    if let Err(err) = storage.save() {
        storage.new(previous);
        return Err(save_failed(err));
    }
    debug!("Updated {}.{}", kind.key(id), name);
    Ok(None)
}

/// Handler for lines whose first word is not a command: the dotted
/// `Class.method(args)` syntax.
///
/// Lines that do not match a supported form print nothing. A supported method
/// with missing arguments reports the same message as the plain command.
pub fn dotted(storage: &mut FileStorage, line: &str) -> Outcome {
    let Some(call) = DottedCall::parse(line) else {
        debug!("Ignoring unrecognized line {:?}", line);
        return Ok(None);
    };
    if EntityKind::lookup(call.class_name).is_none() {
        debug!("Ignoring dotted call on unknown class {:?}", call.class_name);
        return Ok(None);
    }

    let mut args: Vec<&str> = vec![call.class_name];
    args.extend(call.args.iter().copied());

    match (call.method, call.args.len()) {
        ("all", 0) => all(storage, call.class_name),
        ("count", 0) => count(storage, call.class_name),
        ("show", _) => show_args(storage, &args),
        ("destroy", _) => destroy_args(storage, &args),
        ("update", _) => update_args(storage, &args),
        _ => {
            debug!("Ignoring unsupported dotted call {:?}", line);
            Ok(None)
        }
    }
}

/// `help [topic]`
pub fn help(args: &str) -> Outcome {
    let Some(topic) = args.split_whitespace().next() else {
        let names: Vec<String> = Command::iter().map(|c| c.to_string()).collect();
        return Ok(Some(format!(
            "\nDocumented commands (type help <topic>):\n{}\n{}\n",
            "=".repeat(40),
            names.join("  ")
        )));
    };

    match topic.parse::<Command>() {
        Ok(command) => {
            let mut text = command.description().to_string();
            if let Some(usage) = command.usage() {
                text.push('\n');
                text.push_str(usage);
            }
            Ok(Some(text))
        }
        Err(_) => Ok(Some(format!("*** No help on {}", topic))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new_with_path(dir.path().join("file.json"));
        (dir, storage)
    }

    #[test]
    fn test_command_names_parse() {
        assert_eq!("create".parse::<Command>().unwrap(), Command::Create);
        assert_eq!("EOF".parse::<Command>().unwrap(), Command::Eof);
        assert!("eof".parse::<Command>().is_err());
        assert!("User".parse::<Command>().is_err());
    }

    #[test]
    fn test_create_errors() {
        let (_dir, mut storage) = storage();
        assert_eq!(create(&mut storage, ""), Err(CommandError::ClassNameMissing));
        assert_eq!(create(&mut storage, "Nope"), Err(CommandError::ClassDoesNotExist));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_create_applies_typed_parameters() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "Place name=\"Loft\" rooms=3 price=9.5 note=abc")
            .unwrap()
            .unwrap();
        let place = storage.get(EntityKind::Place, &id).unwrap();
        assert_eq!(place.get("name"), Some(&AttrValue::Str("Loft".into())));
        assert_eq!(place.get("rooms"), Some(&AttrValue::Int(3)));
        assert_eq!(place.get("price"), Some(&AttrValue::Float(9.5)));
        assert_eq!(place.get("note"), Some(&AttrValue::Str("abc".into())));
    }

    #[test]
    fn test_create_ignores_reserved_and_malformed_parameters() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "User id=forged bogus a=b=c").unwrap().unwrap();
        assert_ne!(id, "forged");
        let user = storage.get(EntityKind::User, &id).unwrap();
        assert!(user.attributes().is_empty());
    }

    #[test]
    fn test_show_error_order() {
        let (_dir, storage) = storage();
        assert_eq!(show(&storage, ""), Err(CommandError::ClassNameMissing));
        assert_eq!(show(&storage, "Bogus"), Err(CommandError::ClassDoesNotExist));
        assert_eq!(show(&storage, "User"), Err(CommandError::InstanceIdMissing));
        assert_eq!(show(&storage, "User 42"), Err(CommandError::NoInstanceFound));
    }

    #[test]
    fn test_update_error_order() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "State").unwrap().unwrap();
        assert_eq!(update(&mut storage, ""), Err(CommandError::ClassNameMissing));
        assert_eq!(update(&mut storage, "Nope x"), Err(CommandError::ClassDoesNotExist));
        assert_eq!(update(&mut storage, "State"), Err(CommandError::InstanceIdMissing));
        assert_eq!(update(&mut storage, "State missing"), Err(CommandError::NoInstanceFound));
        assert_eq!(
            update(&mut storage, &format!("State {}", id)),
            Err(CommandError::AttributeNameMissing)
        );
        assert_eq!(
            update(&mut storage, &format!("State {} name", id)),
            Err(CommandError::ValueMissing)
        );
    }

    #[test]
    fn test_update_stores_raw_string() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "User").unwrap().unwrap();
        update(&mut storage, &format!("User {} age 42", id)).unwrap();
        let user = storage.get(EntityKind::User, &id).unwrap();
        assert_eq!(user.get("age"), Some(&AttrValue::Str("42".into())));
    }

    #[test]
    fn test_update_reserved_attribute_is_ignored() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "User").unwrap().unwrap();
        assert_eq!(update(&mut storage, &format!("User {} id other", id)), Ok(None));
        assert!(storage.get(EntityKind::User, &id).is_some());
        assert!(storage.get(EntityKind::User, "other").is_none());
    }

    #[test]
    fn test_all_unknown_class() {
        let (_dir, storage) = storage();
        assert_eq!(all(&storage, "Ghost"), Err(CommandError::ClassDoesNotExist));
        assert_eq!(all(&storage, ""), Ok(Some("[]".to_string())));
    }

    #[test]
    fn test_dotted_count_and_unknown_forms() {
        let (_dir, mut storage) = storage();
        create(&mut storage, "City").unwrap();
        create(&mut storage, "City").unwrap();
        assert_eq!(dotted(&mut storage, "City.count()"), Ok(Some("2".to_string())));
        assert_eq!(dotted(&mut storage, "City.explode()"), Ok(None));
        assert_eq!(dotted(&mut storage, "Ghost.count()"), Ok(None));
        assert_eq!(dotted(&mut storage, "gibberish"), Ok(None));
    }

    #[test]
    fn test_dotted_update_routes_to_update() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "Amenity").unwrap().unwrap();
        let line = format!("Amenity.update(\"{}\", \"name\", \"Wifi\")", id);
        assert_eq!(dotted(&mut storage, &line), Ok(None));
        let amenity = storage.get(EntityKind::Amenity, &id).unwrap();
        assert_eq!(amenity.get("name"), Some(&AttrValue::Str("Wifi".into())));
    }

    #[test]
    fn test_dotted_update_keeps_spaces_and_commas_in_value() {
        let (_dir, mut storage) = storage();
        let id = create(&mut storage, "User").unwrap().unwrap();

        let line = format!("User.update(\"{}\", \"name\", \"John Smith\")", id);
        assert_eq!(dotted(&mut storage, &line), Ok(None));
        let line = format!("User.update(\"{}\", \"bio\", \"a, b\")", id);
        assert_eq!(dotted(&mut storage, &line), Ok(None));

        let user = storage.get(EntityKind::User, &id).unwrap();
        assert_eq!(user.get("name"), Some(&AttrValue::Str("John Smith".into())));
        assert_eq!(user.get("bio"), Some(&AttrValue::Str("a, b".into())));
    }

    #[test]
    fn test_dotted_show_without_id_reports_missing_id() {
        let (_dir, mut storage) = storage();
        assert_eq!(
            dotted(&mut storage, "User.show()"),
            Err(CommandError::InstanceIdMissing)
        );
    }

    /// Replace the storage's parent directory with a regular file so every
    /// later save fails
    fn break_storage(dir: &TempDir) {
        let parent = dir.path().join("data");
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "not a directory").unwrap();
    }

    fn nested_storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new_with_path(dir.path().join("data").join("file.json"));
        (dir, storage)
    }

    #[test]
    fn test_create_rolls_back_when_save_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("data"), "not a directory").unwrap();
        let mut storage = FileStorage::new_with_path(dir.path().join("data").join("file.json"));

        let outcome = create(&mut storage, "User name=\"Ada\"");
        assert!(matches!(outcome, Err(CommandError::SaveFailed(_))));
        assert!(storage.is_empty());
        assert_eq!(all(&storage, ""), Ok(Some("[]".to_string())));
    }

    #[test]
    fn test_destroy_restores_entity_when_save_fails() {
        let (dir, mut storage) = nested_storage();
        let id = create(&mut storage, "Place").unwrap().unwrap();
        break_storage(&dir);

        let outcome = destroy(&mut storage, &format!("Place {}", id));
        assert!(matches!(outcome, Err(CommandError::SaveFailed(_))));
        assert!(storage.get(EntityKind::Place, &id).is_some());
    }

    #[test]
    fn test_update_restores_entity_when_save_fails() {
        let (dir, mut storage) = nested_storage();
        let id = create(&mut storage, "City name=\"Austin\"").unwrap().unwrap();
        let before = storage.get(EntityKind::City, &id).cloned().unwrap();
        break_storage(&dir);

        let outcome = update(&mut storage, &format!("City {} name Dallas", id));
        assert!(matches!(outcome, Err(CommandError::SaveFailed(_))));
        assert_eq!(storage.get(EntityKind::City, &id), Some(&before));
    }

    #[test]
    fn test_help_topics() {
        let listing = help("").unwrap().unwrap();
        assert!(listing.contains("create"));
        assert!(listing.contains("EOF"));

        let text = help("show").unwrap().unwrap();
        assert!(text.starts_with("Prints the string representation of an instance"));
        assert!(text.ends_with("Usage: show <class_name> <instance_id>"));

        assert_eq!(help("fly"), Ok(Some("*** No help on fly".to_string())));
    }
}
