//! Built-in vocabulary for the Physique 57 India studios.

/// `(canonical, aliases)`
pub const CLASSES: &[(&str, &[&str])] = &[
    ("Studio Barre 57", &["barre 57", "barre57", "barre", "b57"]),
    ("Studio Barre 57 (Express)", &["barre 57 express", "barre express"]),
    ("Studio Mat 57", &["mat 57", "mat57", "mat"]),
    ("Studio Mat 57 (Express)", &["mat 57 express", "mat express"]),
    ("Studio PowerCycle", &["powercycle", "power cycle", "cycle", "pc"]),
    ("Studio PowerCycle (Express)", &["powercycle express", "power cycle express"]),
    ("Studio FIT", &["fit", "ft", "fitness"]),
    ("Studio HIIT", &["hiit"]),
    ("Studio Cardio Barre", &["cardio barre", "cardiobarre"]),
    ("Studio Cardio Barre Plus", &["cardio barre plus", "cardio barre+"]),
    ("Studio Back Body Blaze", &["back body blaze", "bbb"]),
    ("Studio Back Body Blaze (Express)", &["back body blaze express", "bbb express"]),
    ("Studio Strength Lab (Pull)", &["strength (pull)", "strength pull", "strength lab pull", "pull"]),
    ("Studio Strength Lab (Push)", &["strength (push)", "strength push", "strength lab push", "push"]),
    (
        "Studio Strength Lab (Full Body)",
        &["strength (full body)", "strength full body", "strength lab full body", "strength lab", "strength"],
    ),
    ("Studio Foundations", &["foundations", "foundation"]),
    ("Studio Recovery", &["recovery", "stretch"]),
    ("Studio Amped Up!", &["amped up", "amped"]),
    ("Studio Trainer's Choice", &["trainers choice", "trainer choice"]),
    ("Studio Pre/Post Natal", &["pre post natal", "prenatal", "postnatal"]),
    ("Studio Sweat In 30", &["sweat in 30", "sweat 30"]),
    ("Studio Hosted Class", &["hosted class", "hosted"]),
];

pub const TRAINERS: &[(&str, &[&str])] = &[
    ("Anisha Shah", &["anisha"]),
    ("Simonelle De Vitre", &["simonelle", "simone"]),
    ("Richard D'Costa", &["richard", "richard dcosta"]),
    ("Pranjali Jain", &["pranjali"]),
    ("Mrigakshi Jaiswal", &["mrigakshi"]),
    ("Pramal Hinduja", &["pramal"]),
    ("Karan Bhatia", &["karan"]),
    ("Vivaran Dhasmana", &["vivaran"]),
    ("Reshma Sharma", &["reshma"]),
    ("Rohan Dahima", &["rohan"]),
    ("Saniya Khan", &["saniya"]),
    ("Atulan Purohit", &["atulan"]),
    ("Cauveri Vikrant", &["cauveri"]),
    ("Kajol Kanchan", &["kajol"]),
    ("Raunak Khemuka", &["raunak"]),
    ("Nishanth Raj", &["nishanth"]),
    ("Shruti Kulkarni", &["shruti"]),
    ("Poojitha Bhaskar", &["poojitha"]),
    ("Janhavi Jain", &["janhavi"]),
    ("Veena Narasimhan", &["veena"]),
];

pub const LOCATIONS: &[(&str, &[&str])] = &[
    ("Kwality House, Kemps Corner", &["kwality house", "kemps corner", "kemps", "kwality"]),
    ("Supreme HQ, Bandra", &["supreme hq", "bandra", "supreme"]),
    ("Kenkere House", &["kenkere", "bengaluru", "bangalore"]),
    ("Copper + Cloves", &["copper cloves", "copper and cloves"]),
];

/// Folded texts that are never class names on their own.
pub const CLASS_DENYLIST: &[&str] = &[
    "am", "pm", "express", "studio", "class", "classes", "schedule", "tbd", "tba", "cancelled",
    "full", "body", "lab", "level", "beginner", "advanced", "intermediate", "all levels", "new",
    "theme", "special",
];
