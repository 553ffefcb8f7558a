use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub fn run(app: &App) -> Result<()> {
    match app.session.get_local_user()? {
        Some(user) => {
            println!("{}", format!("Welcome {} !", user.display_name()).bold());
            println!("  {}", user.render());
        }
        None => println!("{}", "Not logged in".dimmed()),
    }
    Ok(())
}
