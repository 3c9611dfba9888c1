use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{OffsetDateTime, macros::datetime};

use budget_tracker::{
    BudgetName, DEFAULT_IDENTITY_HEADER, Emoji, NewBudget, NewTransaction, add_budget,
    add_transaction_to_budget, check_and_add_user, initialize_db,
};

/// A utility for creating a test database for the budget_tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email address of the user that owns the sample budgets.
    ///
    /// Send this address in the identity header to sign in as the test user.
    #[arg(long, short, default_value = "test@example.com")]
    email: String,
}

struct SampleBudget {
    name: &'static str,
    amount: f64,
    emoji: &'static str,
    created_at: OffsetDateTime,
    transactions: &'static [(f64, &'static str, OffsetDateTime)],
}

const SAMPLE_BUDGETS: [SampleBudget; 6] = [
    SampleBudget {
        name: "Alimentation",
        amount: 500_000.0,
        emoji: "🍎",
        created_at: datetime!(2023-01-10 0:00 UTC),
        transactions: &[
            (50_000.0, "Pizzeria", datetime!(2023-01-12 0:00 UTC)),
            (30_000.0, "Boulangerie", datetime!(2023-01-15 0:00 UTC)),
        ],
    },
    SampleBudget {
        name: "Transport",
        amount: 300_000.0,
        emoji: "🚗",
        created_at: datetime!(2023-01-05 0:00 UTC),
        transactions: &[
            (60_000.0, "Essence", datetime!(2023-01-08 0:00 UTC)),
            (15_000.0, "Taxi", datetime!(2023-01-20 0:00 UTC)),
        ],
    },
    SampleBudget {
        name: "Loisirs",
        amount: 200_000.0,
        emoji: "🎉",
        created_at: datetime!(2023-02-01 0:00 UTC),
        transactions: &[(40_000.0, "Cinéma", datetime!(2023-02-03 0:00 UTC))],
    },
    SampleBudget {
        name: "Santé",
        amount: 150_000.0,
        emoji: "💊",
        created_at: datetime!(2023-02-15 0:00 UTC),
        transactions: &[(
            45_000.0,
            "Consultation médicale",
            datetime!(2023-02-17 0:00 UTC),
        )],
    },
    SampleBudget {
        name: "Éducation",
        amount: 400_000.0,
        emoji: "📚",
        created_at: datetime!(2023-03-01 0:00 UTC),
        transactions: &[(100_000.0, "Livres scolaires", datetime!(2023-03-05 0:00 UTC))],
    },
    SampleBudget {
        name: "Maison",
        amount: 600_000.0,
        emoji: "🏠",
        created_at: datetime!(2023-04-01 0:00 UTC),
        transactions: &[(250_000.0, "Meubles", datetime!(2023-04-10 0:00 UTC))],
    },
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.email);
    check_and_add_user(&args.email, &conn)?;

    for sample in &SAMPLE_BUDGETS {
        println!("Adding budget {} {}...", sample.emoji, sample.name);

        let new_budget = NewBudget::new(
            BudgetName::new(sample.name)?,
            sample.amount,
            Emoji::new(sample.emoji)?,
        )
        .created_at(sample.created_at);
        let budget = add_budget(&args.email, new_budget, &conn)?;

        for (amount, description, created_at) in sample.transactions {
            let new_transaction = NewTransaction::new(*amount, description).created_at(*created_at);
            add_transaction_to_budget(budget.id, new_transaction, &conn)?;
        }
    }

    println!(
        "Success! Send the header '{DEFAULT_IDENTITY_HEADER}: {}' to sign in.",
        args.email
    );

    Ok(())
}
