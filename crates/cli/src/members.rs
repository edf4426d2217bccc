use std::path::PathBuf;

use chainscope_api::{InMemoryTypeModel, InvocationSite, MemberInfo, MemberKind, TypeModel};
use chainscope_core::MemberCatalog;
use clap::Args;
use tabled::{Table, Tabled, settings::Style};

#[derive(Args)]
pub struct MembersArgs {
    /// JSON type model snapshot
    #[arg(long, value_name = "MODEL_JSON")]
    pub model: PathBuf,

    /// Fully qualified type name
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Only list static members
    #[arg(long = "static")]
    pub static_only: bool,

    /// Package the members are accessed from
    #[arg(long, value_name = "PACKAGE", default_value = "")]
    pub package: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Member")]
    name: String,
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Declared In")]
    declaring_type: String,
    #[tabled(rename = "Id")]
    id: String,
}

impl From<&MemberInfo> for MemberRow {
    fn from(member: &MemberInfo) -> Self {
        let kind = match member.kind {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
            MemberKind::Constructor => "constructor",
            MemberKind::Local => "local",
        };
        Self {
            kind,
            name: member.readable_name(),
            type_name: member.type_ref.simple_name(),
            declaring_type: member.declaring_type.clone(),
            id: member.id().to_string(),
        }
    }
}

pub fn run(args: MembersArgs) -> Result<(), Box<dyn std::error::Error>> {
    let model = InMemoryTypeModel::load(&args.model)?;
    if !model.is_resolvable(&args.type_name) {
        println!("Type not found: {}", args.type_name);
        return Ok(());
    }

    let catalog = MemberCatalog::new(&model, InvocationSite::in_package(args.package));
    let members = if args.static_only {
        catalog.static_members_of(&args.type_name)
    } else {
        catalog.members_of(&args.type_name)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*members)?);
    } else if members.is_empty() {
        println!("No visible members.");
    } else {
        let rows: Vec<MemberRow> = members.iter().map(MemberRow::from).collect();
        println!("{}", Table::new(rows).with(Style::psql()));
    }
    Ok(())
}
