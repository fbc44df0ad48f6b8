//! Numbered console menu.

use std::io;

use crate::console::UserIo;

pub type MenuAction<'a> = Box<dyn FnMut(&mut dyn UserIo) -> io::Result<()> + 'a>;

/// Ordered list of labelled actions with an implicit trailing `Exit`.
pub struct Menu<'a> {
    title: String,
    options: Vec<(String, MenuAction<'a>)>,
}

impl<'a> Menu<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            options: Vec::new(),
        }
    }

    pub fn option(
        mut self,
        label: impl Into<String>,
        action: impl FnMut(&mut dyn UserIo) -> io::Result<()> + 'a,
    ) -> Self {
        self.options.push((label.into(), Box::new(action)));
        self
    }

    /// Loops until `Exit` is chosen or input runs out.
    pub fn run(&mut self, io: &mut dyn UserIo) -> io::Result<()> {
        io.write_output(&format!("\n ====== | {} | ======", self.title))?;
        let exit_index = self.options.len() + 1;

        loop {
            for (index, (label, _)) in self.options.iter().enumerate() {
                io.write_output(&format!("{}. {label}", index + 1))?;
            }
            io.write_output(&format!("{exit_index}. Exit"))?;

            let Some(input) = io.read_input(&format!("Choose an option: 1-{exit_index} "))? else {
                break;
            };
            let choice = input.trim();
            if choice == exit_index.to_string() {
                break;
            }

            match self.select(choice) {
                Ok(index) => (self.options[index].1)(&mut *io)?,
                Err(reason) => io.write_output(&format!("Invalid option: {choice}. {reason}"))?,
            }
        }

        Ok(())
    }

    fn select(&self, choice: &str) -> Result<usize, &'static str> {
        if choice.is_empty() {
            return Err("Must provide an option");
        }
        match choice.parse::<usize>() {
            Ok(number) if (1..=self.options.len()).contains(&number) => Ok(number - 1),
            _ => Err("Please provide a valid option"),
        }
    }
}
