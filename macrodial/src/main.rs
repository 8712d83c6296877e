use dotenv::dotenv;
use log::{debug, info, warn};
use macrodial::config::Config;
use macrodial::hal::{ActionSink, GpioIndicators, HidKeyboard, LcdDisplay, LogSink};
use macrodial::page::Page;
use macrodial::{App, Hardware, SLOTS};
use macrodial_gpio::GpioActiveLevel::Low;
use macrodial_gpio::GpioBias::PullUp;
use macrodial_gpio::GpioDriveMode::OpenDrain;
use macrodial_gpio::debounce::TimedDebounce;
use macrodial_gpio::gpiod::GpiodDriver;
use macrodial_gpio::keypad::{GpioKeypad, KEYPAD_KEYS, KeyEvents};
use macrodial_gpio::lcd::{CharLcd, GpioCharLcd};
use macrodial_gpio::rotenc::RotEnc;
use macrodial_gpio::GpioDriver;
use std::env::var;
use std::thread;
use std::time::Instant;
use sysinfo::System;

const LCD_COLUMNS: usize = 20;
const LCD_ROWS: usize = 4;

fn parse_pin_bus<const N: usize>(pin_str: &str) -> eyre::Result<[usize; N]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Expected {} pins in {:?}", N, pin_str))
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!("Macrodial v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Running on {} {} (kernel {}), host {}",
        System::name().as_deref().unwrap_or(UNKNOWN_STR),
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR),
    );

    // Get pin numbers from env
    let chip_path = var("MACRODIAL_GPIO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
    let keypad_pin_col_nos: [usize; 3] = parse_pin_bus(&var("MACRODIAL_KEYPAD_PINS_COLS")?)?;
    let keypad_pin_row_nos: [usize; 4] = parse_pin_bus(&var("MACRODIAL_KEYPAD_PINS_ROWS")?)?;
    let [enc_a_pin_no, enc_b_pin_no]: [usize; 2] = parse_pin_bus(&var("MACRODIAL_ENCODER_PINS")?)?;
    let enc_sw_pin_no: usize = var("MACRODIAL_ENCODER_PIN_SW")?.parse()?;
    let [jog_a_pin_no, jog_b_pin_no]: [usize; 2] = parse_pin_bus(&var("MACRODIAL_JOG_PINS")?)?;
    let led_pin_nos: [usize; SLOTS] = parse_pin_bus(&var("MACRODIAL_LED_PINS")?)?;
    let lcd_e_pin_no: usize = var("MACRODIAL_LCD_PIN_E")?.parse()?;
    let lcd_rs_pin_no: usize = var("MACRODIAL_LCD_PIN_RS")?.parse()?;
    let lcd_data_pin_nos: [usize; 4] = parse_pin_bus(&var("MACRODIAL_LCD_PINS_DATA")?)?;

    info!("Keypad @ Cols: {:?}, Rows: {:?}", keypad_pin_col_nos, keypad_pin_row_nos);
    info!("Encoder @ A: {}, B: {}, SW: {}", enc_a_pin_no, enc_b_pin_no, enc_sw_pin_no);
    info!("Jog dial @ A: {}, B: {}", jog_a_pin_no, jog_b_pin_no);
    info!("LEDs @ {:?}", led_pin_nos);
    info!("LCD @ E: {}, RS: {}, Data: {:?}", lcd_e_pin_no, lcd_rs_pin_no, lcd_data_pin_nos);

    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&chip_path)?;
    debug!("{:?} initialized.", gpio);

    debug!("Initializing LCD driver...");
    let mut lcd_e_pin = gpio.get_pin(lcd_e_pin_no)?;
    let lcd_e_out = lcd_e_pin.as_output()?;
    let mut lcd_rs_pin = gpio.get_pin(lcd_rs_pin_no)?;
    let lcd_rs_out = lcd_rs_pin.as_output()?;
    let mut lcd_data_bus = gpio.get_pin_bus(lcd_data_pin_nos)?;
    let lcd_data_out = lcd_data_bus.as_output()?;
    let mut lcd = GpioCharLcd::new_4bit(&*lcd_e_out, &*lcd_rs_out, &*lcd_data_out, LCD_COLUMNS, LCD_ROWS);
    lcd.init()?;
    lcd.print("Macrodial")?;
    debug!("{:?} initialized.", lcd);

    debug!("Initializing keypad driver...");
    let mut keypad_col_bus = gpio.get_pin_bus(keypad_pin_col_nos)?;
    let mut keypad_row_bus = gpio.get_pin_bus(keypad_pin_row_nos)?;
    keypad_col_bus.set_drive_mode(OpenDrain)?;
    keypad_col_bus.set_active_level(Low)?;
    keypad_row_bus.set_bias(PullUp)?;
    keypad_row_bus.set_active_level(Low)?;
    let keypad_col_out = keypad_col_bus.as_output()?;
    let keypad_row_in = keypad_row_bus.as_input()?;
    let keypad = GpioKeypad::new(&*keypad_col_out, &*keypad_row_in);
    let mut key_events = KeyEvents::new(&keypad, KEYPAD_KEYS);
    debug!("{:?} initialized.", keypad);

    debug!("Initializing encoders...");
    let mut enc_a_pin = gpio.get_pin(enc_a_pin_no)?;
    let mut enc_b_pin = gpio.get_pin(enc_b_pin_no)?;
    let mut enc_sw_pin = gpio.get_pin(enc_sw_pin_no)?;
    let mut jog_a_pin = gpio.get_pin(jog_a_pin_no)?;
    let mut jog_b_pin = gpio.get_pin(jog_b_pin_no)?;
    for pin in [&mut enc_a_pin, &mut enc_b_pin, &mut enc_sw_pin, &mut jog_a_pin, &mut jog_b_pin] {
        pin.set_bias(PullUp)?;
    }
    enc_sw_pin.set_active_level(Low)?;
    let enc_a_in = enc_a_pin.as_input()?;
    let enc_b_in = enc_b_pin.as_input()?;
    let enc_sw_in = enc_sw_pin.as_input()?;
    let jog_a_in = jog_a_pin.as_input()?;
    let jog_b_in = jog_b_pin.as_input()?;
    let mut encoder = RotEnc::new(&*enc_a_in, &*enc_b_in);
    let mut encoder_switch = TimedDebounce::new(&*enc_sw_in);
    let mut jog = RotEnc::new(&*jog_a_in, &*jog_b_in);

    debug!("Initializing LEDs...");
    let mut led_bus = gpio.get_pin_bus(led_pin_nos)?;
    let led_out = led_bus.as_output()?;
    let mut indicators = GpioIndicators::new(&*led_out);

    let mut hid;
    let mut log_sink = LogSink;
    let actions: &mut dyn ActionSink = match var("MACRODIAL_HID_DEVICE") {
        Ok(path) => {
            info!("HID keyboard @ {}", path);
            hid = HidKeyboard::open(&path)?;
            &mut hid
        }
        Err(_) => {
            warn!("MACRODIAL_HID_DEVICE not set, actions will only be logged.");
            &mut log_sink
        }
    };

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    lcd.clear_display()?;
    let mut display = LcdDisplay::new(&mut lcd);

    let hardware = Hardware {
        keys: &mut key_events,
        encoder: &mut encoder,
        encoder_switch: &mut encoder_switch,
        jog: &mut jog,
        indicators: &mut indicators,
        display: &mut display,
        actions,
    };
    let mut app = App::new(config.settings(), hardware, Instant::now())?;
    app.set_sleep_page(Page::sleep());
    app.set_selection_page(Page::selection(Some(&config.selection_title)));
    for page in config.build_pages()? {
        app.add_page(page)?;
    }

    info!("Macrodial initialized, starting main loop...");

    let tick = config.tick();
    loop {
        app.update(Instant::now())?;
        thread::sleep(tick);
    }
}
