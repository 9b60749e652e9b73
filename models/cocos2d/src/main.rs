use std::path::{
	Path,
	PathBuf
};

use clap::{
	Args,
	Parser,
	Subcommand
};

use meru_models_cocos2d::{
	C3bImportError,
	C3bParser
};

#[derive(Parser)]
#[command(name = "c3b")]
#[command(about = "Inspect Cocos2d-x binary models")]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Args)]
struct Input {
	/// C3B files to read
	#[arg(required = true)]
	files: Vec<PathBuf>,

	/// Which section of the requested type to decode
	#[arg(short, long, default_value_t = 0)]
	index: usize,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the version and reference table
	Header(Input),
	/// Print the meshes and their vertex layouts
	Meshes(Input),
	Materials(Input),
	Nodes(Input),
	/// Print the flattened skeleton of a node section
	Skeleton(Input),
	Animations(Input),
}

fn print_header(file: &Path, parser: &mut C3bParser<'_>) -> Result<(), C3bImportError> {
	let header = parser.read_header()?;

	println!("File: {}", file.display());
	println!("Version: {}.{}", header.major_version, header.minor_version);
	println!("RefCount: {}", header.references.len());

	for reference in header.references.iter() {
		println!("ID: {}", reference.id);
		println!("Type: {}", reference.kind);
		println!("Offset: {}", reference.offset);
		println!();
	}
	println!();

	Ok(())
}

fn print_meshes(file: &Path, parser: &mut C3bParser<'_>, index: usize) -> Result<(), C3bImportError> {
	let meshes = parser.read_meshes(index)?;

	println!("File: {}", file.display());
	println!("MeshCount: {}", meshes.len());

	for mesh in meshes.iter() {
		println!();
		println!("ID: {}", mesh.id);
		println!("VertexCount: {}", mesh.vertex_array.vertex_count());
		println!("IndexCount: {}", mesh.indices.len());
		println!("AttributeCount: {}", mesh.vertex_array.attributes.len());

		for attribute in mesh.vertex_array.attributes.iter() {
			println!();
			println!("Name: {}", attribute.name);
			println!("Type: {}", attribute.kind);
			println!("ValueCount: {}", attribute.value_count);
		}
		println!();
	}

	Ok(())
}

fn main() -> Result<(), C3bImportError> {
	env_logger::init();

	let cli = Cli::parse();
	let input = match &cli.command {
		Commands::Header(input)
		| Commands::Meshes(input)
		| Commands::Materials(input)
		| Commands::Nodes(input)
		| Commands::Skeleton(input)
		| Commands::Animations(input) => input,
	};

	for file in input.files.iter() {
		let data = C3bParser::read_file(file)?;
		let mut parser = C3bParser::new(&data);

		if !parser.verify_signature() {
			println!("ERROR: {} is not a c3b file.", file.display());
			continue;
		}

		match &cli.command {
			Commands::Header(_) => print_header(file, &mut parser)?,
			Commands::Meshes(_) => print_meshes(file, &mut parser, input.index)?,
			Commands::Materials(_) => println!("{:#?}", parser.read_materials(input.index)?),
			Commands::Nodes(_) => println!("{:#?}", parser.read_nodes(input.index)?),
			Commands::Skeleton(_) => println!("{:#?}", parser.read_skeleton(input.index)?),
			Commands::Animations(_) => println!("{:#?}", parser.read_animation(input.index)?),
		}
	}

	Ok(())
}
