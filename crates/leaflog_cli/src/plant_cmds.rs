//! Interactive plant commands behind the console menu.

use std::io;

use leaflog_core::{
    now_epoch_ms, parse_plant_id, ImportError, ImportReport, Plant, PlantDraft, PlantId,
    PlantService, PlantServiceError, PlantStore,
};

use crate::console::UserIo;
use crate::menu::Menu;

const NAME_PROMPT: &str = "Enter the name of the plant: ";
const SPECIES_PROMPT: &str = "Enter the species of the plant: ";
const FREQUENCY_PROMPT: &str = "Enter the watering frequency in days: ";
const NOTES_PROMPT: &str = "Enter any notes for the plant: ";
const ID_PROMPT: &str = "Enter the id of the plant: ";
const PATH_PROMPT: &str = "Enter file path: ";

/// Renders one plant as a single console line.
pub fn format_plant(plant: &Plant, now_ms: i64) -> String {
    let status = plant.watering_status(now_ms);
    let watered = match status.days_since_watered {
        None => "never watered".to_string(),
        Some(0) => "watered today".to_string(),
        Some(1) => "watered 1 day ago".to_string(),
        Some(days) => format!("watered {days} days ago"),
    };
    let due = if status.is_due { " | due" } else { "" };
    let mut line = format!(
        "{} | {} | {} | every {} days | {watered}{due}",
        plant.id(),
        plant.name(),
        plant.species(),
        plant.watering_frequency().days(),
    );
    if !plant.notes().is_empty() {
        line.push_str(" | ");
        line.push_str(plant.notes().as_str());
    }
    line
}

/// Console front-end for one plant service.
pub struct PlantCommands<'s, S: PlantStore> {
    service: &'s PlantService<S>,
}

impl<'s, S: PlantStore> PlantCommands<'s, S> {
    pub fn new(service: &'s PlantService<S>) -> Self {
        Self { service }
    }

    /// Main menu wired to every command.
    pub fn main_menu<'m>(&'m self) -> Menu<'m> {
        Menu::new("Main Menu")
            .option("Add plant", move |io| self.add_plant(io))
            .option("Delete plant", move |io| self.delete_plant(io))
            .option("Edit plant", move |io| self.edit_plant(io))
            .option("Water plant", move |io| self.water_plant(io))
            .option("View plant list", move |io| self.view_plants(io))
            .option("Add plants from file", move |io| self.add_plants_from_file(io))
    }

    pub fn add_plant(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let Some(draft) = read_draft(io, Some(now_epoch_ms()))? else {
            return Ok(());
        };
        let input = match draft.parse() {
            Ok(input) => input,
            Err(err) => return io.write_output(&format!("Invalid Input! {err}")),
        };

        match self.service.create_plant(&input) {
            Ok(plant) => {
                io.write_output("Plant added successfully!")?;
                io.write_output(&format_plant(&plant, now_epoch_ms()))?;
                io.write_output("")
            }
            Err(err) => report_failure(io, &err),
        }
    }

    pub fn delete_plant(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let Some(id) = read_id(io)? else {
            return Ok(());
        };
        let id = match id {
            Ok(id) => id,
            Err(err) => return report_failure(io, &err),
        };

        match self.service.delete_plant(id) {
            Ok(_) => {
                io.write_output("Plant deleted successfully!")?;
                io.write_output("")
            }
            Err(err) => report_failure(io, &err),
        }
    }

    /// Replaces name, species, frequency and notes; keeps the watering record.
    pub fn edit_plant(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let Some(id) = read_id(io)? else {
            return Ok(());
        };
        let existing = match id.and_then(|id| self.service.get_plant(id)) {
            Ok(plant) => plant,
            Err(err) => return report_failure(io, &err),
        };

        let Some(draft) = read_draft(io, existing.last_watered().epoch_ms())? else {
            return Ok(());
        };
        let input = match draft.parse() {
            Ok(input) => input,
            Err(err) => return io.write_output(&format!("Invalid Input! {err}")),
        };

        match self.service.update_plant(existing.id(), &input) {
            Ok(plant) => {
                io.write_output("Plant updated successfully!")?;
                io.write_output(&format_plant(&plant, now_epoch_ms()))?;
                io.write_output("")
            }
            Err(err) => report_failure(io, &err),
        }
    }

    pub fn water_plant(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let Some(id) = read_id(io)? else {
            return Ok(());
        };

        match id.and_then(|id| self.service.mark_watered(id)) {
            Ok(plant) => {
                io.write_output("Plant watered successfully!")?;
                io.write_output(&format_plant(&plant, now_epoch_ms()))?;
                io.write_output("")
            }
            Err(err) => report_failure(io, &err),
        }
    }

    pub fn view_plants(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let plants = match self.service.list_plants() {
            Ok(plants) => plants,
            Err(err) => return report_failure(io, &err),
        };

        if plants.is_empty() {
            io.write_output("No plants yet.")?;
        }
        let now_ms = now_epoch_ms();
        for plant in &plants {
            io.write_output(&format_plant(plant, now_ms))?;
        }
        io.write_output("")
    }

    pub fn add_plants_from_file(&self, io: &mut dyn UserIo) -> io::Result<()> {
        let Some(path) = io.read_input(PATH_PROMPT)? else {
            return Ok(());
        };

        match self.service.import_file(path.trim()) {
            Ok(report) => write_report(io, &report),
            Err(err @ (ImportError::Open { .. } | ImportError::Stream(_))) => {
                io.write_output(&format!("Failed to read file: {err}"))
            }
            Err(err @ ImportError::Persistence { .. }) => {
                io.write_output(&format!("An unexpected error occurred! {err}"))
            }
        }
    }
}

/// Prints created plants, then rejected lines.
pub fn write_report(io: &mut dyn UserIo, report: &ImportReport) -> io::Result<()> {
    let now_ms = now_epoch_ms();
    for plant in &report.created {
        io.write_output(&format_plant(plant, now_ms))?;
    }
    for message in report.error_messages() {
        io.write_output(&message)?;
    }
    io.write_output(&format!(
        "Imported {} plant(s), {} line(s) rejected.",
        report.created.len(),
        report.errors.len()
    ))
}

fn report_failure(io: &mut dyn UserIo, err: &PlantServiceError) -> io::Result<()> {
    let message = match err {
        PlantServiceError::Validation(_) => format!("Invalid Data! {err}"),
        PlantServiceError::NotFound(_) => format!("Plant not found! {err}"),
        PlantServiceError::MalformedNumber(_) | PlantServiceError::MalformedId(_) => {
            format!("Invalid Input! {err}")
        }
        PlantServiceError::IdSpaceExhausted { .. } | PlantServiceError::Store(_) => {
            format!("An unexpected error occurred! {err}")
        }
    };
    io.write_output(&message)
}

fn read_id(io: &mut dyn UserIo) -> io::Result<Option<Result<PlantId, PlantServiceError>>> {
    Ok(io.read_input(ID_PROMPT)?.map(|raw| parse_plant_id(&raw)))
}

fn read_draft(io: &mut dyn UserIo, last_watered: Option<i64>) -> io::Result<Option<PlantDraft>> {
    let Some(name) = io.read_input(NAME_PROMPT)? else {
        return Ok(None);
    };
    let Some(species) = io.read_input(SPECIES_PROMPT)? else {
        return Ok(None);
    };
    let Some(watering_frequency) = io.read_input(FREQUENCY_PROMPT)? else {
        return Ok(None);
    };
    let Some(notes) = io.read_input(NOTES_PROMPT)? else {
        return Ok(None);
    };

    Ok(Some(PlantDraft {
        name,
        species,
        watering_frequency,
        notes,
        last_watered,
    }))
}
