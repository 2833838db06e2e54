// src/adapter/console.rs
// Interactive ordering screens

use std::io::{BufRead, Write};

use crate::adapter::render;
use crate::application::dto::parser::{
    parse_choice, parse_decimal, parse_number_in_range, parse_text, parse_yes_no, Choice,
};
use crate::application::dto::{ApplicationError, RemovedLine};
use crate::application::usecase::{OrderSession, OrderingUseCase};
use crate::domain::catalog::LookupKey;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::models::{CustomerDetails, Fulfilment};

/// Where to go once a screen is done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Stay,
    Restart,
    Quit,
}

/// Drives one operator through ordering screens over any line-based input
pub struct Console<R, W> {
    session: OrderSession,
    input: R,
    output: W,
    version: String,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(session: OrderSession, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn session(&self) -> &OrderSession {
        &self.session
    }

    /// Run until the operator quits or input ends
    pub fn run(&mut self) -> AppResult<()> {
        match self.run_screens() {
            Err(AppError::InputClosed) => {
                log::info!("Input closed, leaving");
                Ok(())
            }
            other => other,
        }
    }

    fn run_screens(&mut self) -> AppResult<()> {
        let banner = render::banner(&self.version);
        self.say(&banner)?;

        loop {
            self.init_screen()?;
            if self.main_screen()? == Next::Quit {
                break;
            }
        }

        self.say("Goodbye!")?;
        Ok(())
    }

    fn init_screen(&mut self) -> AppResult<()> {
        let discount = render::format_price(self.session.terms().frozen_discount_per_unit);
        let delivery_charge = render::format_price(self.session.terms().delivery_charge);

        let name = self.ask(&["Please enter the name of the customer".to_string()], parse_text)?;
        let phone = self.ask(
            &["Please enter the phone number of the customer".to_string()],
            parse_text,
        )?;
        let frozen = self.ask(
            &[
                "Would you like your order frozen? [Y/N] Frozen orders".to_string(),
                format!("receive a discount of {} per fish item", discount),
            ],
            parse_yes_no,
        )?;
        let delivery = self.ask(
            &[
                "Would the customer like delivery? [Y/N]".to_string(),
                format!("Delivery will cost an extra {}", delivery_charge),
            ],
            parse_yes_no,
        )?;
        let fulfilment = if delivery {
            let address = self.ask(
                &[
                    "Please enter the address the customer".to_string(),
                    "would like to have it delivered to".to_string(),
                ],
                parse_text,
            )?;
            Fulfilment::Delivery { address }
        } else {
            Fulfilment::Pickup
        };

        self.session.start_order(CustomerDetails {
            name,
            phone,
            frozen,
            fulfilment,
        })?;
        Ok(())
    }

    fn main_screen(&mut self) -> AppResult<Next> {
        let lines = [
            "1) Display Menu \"Displays a list of available goods\"".to_string(),
            "2) Add item \"Adds an item to the order\"".to_string(),
            "3) Remove item \"Removes an item from the order\"".to_string(),
            "4) List order \"Displays the contents of the order\"".to_string(),
            "5) Finish Order \"Finalizes the order\"".to_string(),
            "6) Cancel \"Cancels the current order and resets\"".to_string(),
        ];

        loop {
            let selection = self.ask(&lines, |s| parse_number_in_range(s, 1u32, 6))?;
            let next = match selection {
                1 => {
                    self.show_menu()?;
                    Next::Stay
                }
                2 => {
                    self.add_screen()?;
                    Next::Stay
                }
                3 => {
                    self.remove_screen()?;
                    Next::Stay
                }
                4 => {
                    self.show_order()?;
                    Next::Stay
                }
                5 => self.finish_screen()?,
                _ => self.cancel_screen()?,
            };

            if next != Next::Stay {
                return Ok(next);
            }
        }
    }

    fn add_screen(&mut self) -> AppResult<()> {
        let lines = [
            "Enter \"menu\" to display the menu".to_string(),
            "\"back\" to go back or type the number".to_string(),
            "corresponding to a menu item".to_string(),
        ];

        loop {
            let count = self.session.catalog().category_count();
            let choice = self.ask(&lines, |s| parse_choice(s, &["menu", "back"], count))?;
            match choice {
                Choice::Keyword(keyword) if keyword == "menu" => self.show_menu()?,
                Choice::Keyword(_) => return Ok(()),
                Choice::Index(index) => match self.session.catalog().resolve_index(index)? {
                    LookupKey::ByCategory(name) => self.add_bulk(&name)?,
                    LookupKey::ByItem(item) => self.add_item(&item)?,
                },
            }
        }
    }

    fn add_bulk(&mut self, name: &str) -> AppResult<()> {
        let order = self.session.current()?;
        if order.remaining_bulk_slots() == 0 {
            return self.say(&render::error(&format!(
                "You cannot add any more lots of {}",
                name
            )));
        }

        let max = order.terms().max_bulk_unit_size;
        let lines = [
            "Enter \"back\" to go back or enter the amount of".to_string(),
            format!("{} you would like. You cannot add more", name),
            format!("than {}", max),
        ];

        loop {
            let Some(amount) = self.ask(&lines, |s| or_back(s, parse_decimal))? else {
                return Ok(());
            };
            match self.session.current_mut()?.add_bulk(amount) {
                Ok(stored) => {
                    return self.say(&render::good(&format!(
                        "Added {} of {} to the order",
                        stored, name
                    )));
                }
                Err(e) => self.say(&render::error(&e.to_string()))?,
            }
        }
    }

    fn add_item(&mut self, item: &str) -> AppResult<()> {
        let remaining = self.session.current()?.remaining_capacity(item)?;
        if remaining == 0 {
            return self.say(&render::error(&format!(
                "You cannot add any more \"{}\"!",
                item
            )));
        }

        let lines = [
            "Enter \"back\" to go back or enter the amount of".to_string(),
            format!("\"{}\" you would like. You cannot add more", item),
            format!("than {}", remaining),
        ];

        loop {
            let Some(quantity) =
                self.ask(&lines, |s| or_back(s, |s| parse_number_in_range(s, 1u32, remaining)))?
            else {
                return Ok(());
            };
            match self.session.current_mut()?.add_discrete(item, quantity) {
                Ok(_) => {
                    return self.say(&render::good(&format!("Added {} {}", quantity, item)));
                }
                Err(e) => self.say(&render::error(&e.to_string()))?,
            }
        }
    }

    fn remove_screen(&mut self) -> AppResult<()> {
        let lines = [
            "Enter \"order\" to list the current order".to_string(),
            "\"back\" to go back or type the number".to_string(),
            "corresponding to a order item to remove".to_string(),
        ];

        if self.session.current()?.is_empty() {
            return self.say("The current order is empty!");
        }
        self.show_order()?;

        loop {
            let order = self.session.current()?;
            let len = order.discrete_items().len() + order.bulk_entries().len();
            if len == 0 {
                return self.say("The current order is empty!");
            }

            let choice = self.ask(&lines, |s| parse_choice(s, &["order", "back"], len))?;
            match choice {
                Choice::Keyword(keyword) if keyword == "order" => self.show_order()?,
                Choice::Keyword(_) => return Ok(()),
                Choice::Index(index) => {
                    let message = match self.session.remove_line(index)? {
                        RemovedLine::Discrete { item, quantity } => {
                            format!("Removed {} {}", quantity, item)
                        }
                        RemovedLine::Bulk { quantity } => {
                            let name = self
                                .session
                                .catalog()
                                .bulk_category()
                                .map(|c| c.name.clone())
                                .unwrap_or_default();
                            format!("Removed {} of {}", quantity, name)
                        }
                    };
                    self.say(&render::good(&message))?;
                }
            }
        }
    }

    fn finish_screen(&mut self) -> AppResult<Next> {
        if self.session.current()?.is_empty() {
            self.say(&render::error(&ApplicationError::EmptyOrder.to_string()))?;
            return Ok(Next::Stay);
        }

        self.show_order()?;
        let confirmed = self.ask(
            &[
                "Is the listed order correct? [Y/N]".to_string(),
                "Selecting no will return to the menu.".to_string(),
            ],
            parse_yes_no,
        )?;
        if !confirmed {
            return Ok(Next::Stay);
        }

        let receipt = self.session.finish()?;
        let text = render::receipt(&receipt, self.session.catalog());
        self.say(&text)?;
        self.start_again()
    }

    fn cancel_screen(&mut self) -> AppResult<Next> {
        self.session.cancel()?;
        self.say("Current order cancelled")?;
        self.start_again()
    }

    fn start_again(&mut self) -> AppResult<Next> {
        let again = self.ask(
            &["Would you like to start again? (Y/N)".to_string()],
            parse_yes_no,
        )?;
        Ok(if again { Next::Restart } else { Next::Quit })
    }

    fn show_menu(&mut self) -> AppResult<()> {
        let text = render::menu(self.session.catalog());
        self.say(&text)
    }

    fn show_order(&mut self) -> AppResult<()> {
        let totals = self.session.totals()?;
        let text = render::order_list(self.session.current()?, self.session.catalog(), &totals);
        self.say(&text)
    }

    /// Prompt until `parse` accepts the answer
    fn ask<T, F>(&mut self, lines: &[String], parse: F) -> AppResult<T>
    where
        F: Fn(&str) -> Result<T, ApplicationError>,
    {
        loop {
            write!(self.output, "{}", render::prompt(lines))?;
            self.output.flush()?;

            let line = self.read_line()?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    log::debug!("Rejected input {:?}: {}", line, e);
                    self.say(&render::error(&e.to_string()))?;
                }
            }
        }
    }

    fn read_line(&mut self) -> AppResult<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, text: &str) -> AppResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}

/// `None` when the operator typed "back", otherwise the parsed value
fn or_back<T>(
    input: &str,
    parse: impl Fn(&str) -> Result<T, ApplicationError>,
) -> Result<Option<T>, ApplicationError> {
    if input.trim().eq_ignore_ascii_case("back") {
        return Ok(None);
    }
    parse(input).map(Some)
}
