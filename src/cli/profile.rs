//! Profile command implementation

use anyhow::Result;

use crate::journal::RequestContext;

pub fn run(ctx: &RequestContext<'_>) -> Result<()> {
    let user = &ctx.user;
    let entries = ctx.store.count_entries(&user.username)?;

    println!("Welcome {}", user.name);
    println!("{}", "-".repeat(40));
    println!("{:<15} {}", "Name:", user.name);
    println!("{:<15} {}", "Username:", user.username);
    println!("{:<15} {}", "Date of Birth:", user.dob);
    println!("{:<15} {} cm", "Height:", user.height_cm);
    println!("{:<15} {} kg", "Weight:", user.weight_kg);
    println!("{:<15} {}", "Entries:", entries);
    Ok(())
}
