use clap::{arg,crate_version,Command};
use huffcode::huff;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("existing file will not be truncated");
            return true;
        }
        return false;
    }
    true
}

/// open for writing, the caller sets the final length
fn open_out(path_out: &str) -> Result<std::fs::File,std::io::Error> {
    std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `huffcode compress -m header -i my_expanded -o my_compressed`
Expand:        `huffcode expand -m header -i my_compressed -o my_expanded`
With table:    `huffcode compress -m table -i my_expanded -o my_compressed -t my_codes`
Table only:    `huffcode table -i my_expanded -o my_codes`";

    let methods = ["header","table"];

    let mut main_cmd = Command::new("huffcode")
        .about("Compress and expand with static Huffman codes")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-m --method <METHOD> "where the code tree goes").value_parser(methods)
            .required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-t --table <PATH> "code table path, required with table method").required(false))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-m --method <METHOD> "where the code tree comes from").value_parser(methods)
            .required(true))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-t --table <PATH> "code table path, required with table method").required(false))
        .about("expand a file"));

    main_cmd = main_cmd.subcommand(Command::new("table")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "code table path").required(true))
        .about("write the code table for a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let path_table = cmd.get_one::<String>("table");
        if method=="table" && path_table.is_none() {
            eprintln!("table method needs --table");
            return Err(Box::new(std::fmt::Error));
        }
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        if let (true,Some(path_table)) = (method=="table",path_table) {
            if !ok_to_overwrite(path_table) {
                eprintln!("abort operation");
                return Ok(());
            }
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = open_out(path_out)?;
        let (in_size,out_size) = match (method.as_str(),path_table) {
            ("header",_) => huff::compress(&mut in_file,&mut out_file,&huff::STD_OPTIONS)?,
            ("table",Some(path_table)) => {
                let mut table_file = std::io::BufWriter::new(std::fs::File::create(path_table)?);
                huff::compress_with_table(&mut in_file,&mut out_file,&mut table_file,&huff::STD_OPTIONS)?
            },
            _ => {
                eprintln!("{} not supported",method);
                return Err(Box::new(std::fmt::Error));
            }
        };
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let path_table = cmd.get_one::<String>("table");
        if method=="table" && path_table.is_none() {
            eprintln!("table method needs --table");
            return Err(Box::new(std::fmt::Error));
        }
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = open_out(path_out)?;
        let (in_size,out_size) = match (method.as_str(),path_table) {
            ("header",_) => huff::expand(&mut in_file,&mut out_file,&huff::STD_OPTIONS)?,
            ("table",Some(path_table)) => {
                let table_file = std::io::BufReader::new(std::fs::File::open(path_table)?);
                huff::expand_with_table(&mut in_file,table_file,&mut out_file,&huff::STD_OPTIONS)?
            },
            _ => {
                eprintln!("{} not supported",method);
                return Err(Box::new(std::fmt::Error));
            }
        };
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("table") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        if !ok_to_overwrite(path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let in_size = huff::write_table_for(&mut in_file,&mut out_file,&huff::STD_OPTIONS)?;
        eprintln!("wrote code table for {} bytes",in_size);
    }

    Ok(())
}
